use thiserror::Error;
use warp::reject;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// A field failed its constraints.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No record has the given ID.
    #[error("feedback {id} not found")]
    NotFound { id: String },

    /// A reference names a record that does not exist.
    #[error("{field} refers to non-existent feedback {id}")]
    ReferentialIntegrity { field: &'static str, id: String },

    /// The submitted document could not be interpreted.
    #[error("malformed input: {source}")]
    MalformedInput { source: serde_json::Error },

    /// An ID taken from a path could not be decoded.
    #[error("invalid ID: {0}")]
    InvalidId(String),

    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },
}

impl FeedbackError {
    /// Returns the name of the offending field, if the error concerns one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            FeedbackError::Validation(e) => Some(e.field()),
            FeedbackError::ReferentialIntegrity { field, .. } => Some(*field),
            _ => None,
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        FeedbackError::NotFound { id: id.into() }
    }

    pub fn dangling_duplicate(id: impl Into<String>) -> Self {
        FeedbackError::ReferentialIntegrity {
            field: "duplicate_of",
            id: id.into(),
        }
    }
}

/// Enumerates the ways a single field can violate its constraints.
/// Every variant names the field concerned.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be at most {max} characters long")]
    TooLong { field: &'static str, max: usize },

    #[error("{value:?} is not a valid choice for {field}")]
    InvalidChoice { field: &'static str, value: String },

    #[error("{field} must be a valid email address")]
    MalformedEmail { field: &'static str },

    #[error("duplicate id: feedback {id} already exists")]
    DuplicateId { id: String },

    #[error("{field} is read-only")]
    ReadOnly { field: &'static str },

    #[error("feedback cannot be a duplicate of itself")]
    SelfReference,

    #[error("cannot order by {value:?}")]
    InvalidOrdering { value: String },

    #[error("{value:?} is not a valid value for filter {field}")]
    InvalidFilter { field: &'static str, value: String },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        use ValidationError::*;

        match self {
            Missing { field }
            | TooLong { field, .. }
            | InvalidChoice { field, .. }
            | MalformedEmail { field }
            | ReadOnly { field }
            | InvalidFilter { field, .. } => *field,
            DuplicateId { .. } => "id",
            SelfReference => "duplicate_of",
            InvalidOrdering { .. } => "o",
        }
    }
}

impl reject::Reject for FeedbackError {}
