use std::sync::Arc;

use log::Logger;

use crate::admin::AdminSite;
use crate::db::Db;
use crate::urls::Urls;

pub type SafeDb = dyn Db + Send + Sync;

/// Everything a request handler needs, cheap to clone.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub db: Arc<SafeDb>,
    pub urls: Arc<Urls>,
    pub admin: Arc<AdminSite>,
    pub config: Config,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        db: Arc<SafeDb>,
        urls: Arc<Urls>,
        admin: Arc<AdminSite>,
        config: Config,
    ) -> Self {
        Self {
            logger,
            db,
            urls,
            admin,
            config,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// How many records a list returns when the request does not say.
    pub(crate) list_per_page: u32,
}

impl Config {
    pub fn new(list_per_page: u32) -> Self {
        Self { list_per_page }
    }
}
