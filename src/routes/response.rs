use serde::Serialize;

use crate::feedback::{Feedback, FeedbackSummary};

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Count {
        count: i64,
    },
    Duplicates {
        id: String,
        duplicates: Vec<FeedbackSummary>,
    },
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
    },
    List {
        /// Matching records across all pages.
        count: i64,
        results: Vec<Feedback>,
    },
}
