use serde::Serialize;
use warp::reject;

use crate::errors::FeedbackError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: FeedbackError,
}

impl Rejection {
    pub fn new(context: Context, error: FeedbackError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            message: format!("{}", self.error),
            field: self.error.field(),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) field: Option<&'static str>,
}

/// What the request was trying to do when it failed.
#[derive(Clone, Debug, Serialize)]
pub struct Context {
    operation: Operation,

    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Count,
    Create,
    Delete,
    Duplicates,
    List,
    Retrieve,
    Update,
}

impl Context {
    fn new(operation: Operation, id: Option<String>) -> Self {
        Context { operation, id }
    }

    pub fn count() -> Context {
        Context::new(Operation::Count, None)
    }

    pub fn create(id: Option<String>) -> Context {
        Context::new(Operation::Create, id)
    }

    pub fn delete(id: String) -> Context {
        Context::new(Operation::Delete, Some(id))
    }

    pub fn duplicates(id: String) -> Context {
        Context::new(Operation::Duplicates, Some(id))
    }

    pub fn list() -> Context {
        Context::new(Operation::List, None)
    }

    pub fn retrieve(id: String) -> Context {
        Context::new(Operation::Retrieve, Some(id))
    }

    pub fn update(id: String) -> Context {
        Context::new(Operation::Update, Some(id))
    }
}
