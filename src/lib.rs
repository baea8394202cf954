pub mod admin;
pub mod config;
pub mod db;
pub mod environment;
pub mod errors;
pub mod feedback;
pub mod normalization;
pub mod query;
pub mod routes;
pub mod urls;
