use std::time::{Duration, Instant};

use futures::TryStreamExt;
use log::{debug, o};
use time::OffsetDateTime;
use uuid::Uuid;
use warp::{
    http::StatusCode,
    hyper::body::Bytes,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::environment::Environment;
use crate::errors::FeedbackError;
use crate::feedback::{FeedbackChanges, NewFeedback};
use crate::routes::{
    query::ListParams,
    rejection::{Context, Rejection},
    response::SuccessResponse,
};

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($expression:stmt);+) => {
        let start = Instant::now();

        let result = { $($expression)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    };
}

pub async fn list(environment: Environment, params: ListParams) -> RouteResult {
    timed! {
        let error_handler = |e: FeedbackError| Rejection::new(Context::list(), e);

        let query = params
            .into_query(OffsetDateTime::now_utc(), environment.config.list_per_page)
            .map_err(FeedbackError::from)
            .map_err(error_handler)?;
        debug!(environment.logger, "Listing feedback..."; "query" => ?query);

        let count = environment
            .db
            .count(query.clone())
            .await
            .map_err(error_handler)?;
        let results = environment
            .db
            .list(query)
            .try_collect::<Vec<_>>()
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::List { count, results })
    }
}

pub async fn count(environment: Environment, params: ListParams) -> RouteResult {
    timed! {
        let error_handler = |e: FeedbackError| Rejection::new(Context::count(), e);

        let query = params
            .into_query(OffsetDateTime::now_utc(), environment.config.list_per_page)
            .map_err(FeedbackError::from)
            .map_err(error_handler)?;

        let count = environment
            .db
            .count(query)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::Count { count })
    }
}

pub async fn create(environment: Environment, body: Bytes) -> RouteResult {
    let start = Instant::now();

    let new_feedback = serde_json::from_slice(&body)
        .map_err(|source| FeedbackError::MalformedInput { source })
        .and_then(NewFeedback::from_json)
        .map_err(|e| Rejection::new(Context::create(None), e))?;

    let logger = environment.logger.new(o!(
        "request_id" => Uuid::new_v4().to_string(),
        "id" => new_feedback.id.clone()
    ));
    let error_handler = |e: FeedbackError| Rejection::new(Context::create(Some(new_feedback.id.clone())), e);

    debug!(logger, "Creating feedback...");
    let feedback = environment
        .db
        .create(new_feedback.clone())
        .await
        .map_err(error_handler)?;

    let location = environment
        .urls
        .feedback(&feedback.id)
        .map_err(|_| error_handler(FeedbackError::InvalidId(feedback.id.clone())))?;

    Ok(Box::new(with_header(
        with_header(
            with_status(json(&feedback), StatusCode::CREATED),
            "location",
            location.as_str(),
        ),
        SERVER_TIMING_HEADER,
        format_server_timing(start.elapsed()),
    )) as Box<dyn Reply>)
}

pub async fn retrieve(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: FeedbackError| Rejection::new(Context::retrieve(id.clone()), e);

        let id = decode_id(&id).map_err(error_handler)?;
        debug!(environment.logger, "Retrieving feedback..."; "id" => &id);

        let detail = environment.db.retrieve(&id).await.map_err(error_handler)?;

        json(&detail)
    }
}

pub async fn update(environment: Environment, id: String, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = |e: FeedbackError| Rejection::new(Context::update(id.clone()), e);

        let id = decode_id(&id).map_err(error_handler)?;
        let logger = environment.logger.new(o!(
            "request_id" => Uuid::new_v4().to_string(),
            "id" => id.clone()
        ));

        let changes = serde_json::from_slice(&body)
            .map_err(|source| FeedbackError::MalformedInput { source })
            .and_then(FeedbackChanges::from_json)
            .map_err(error_handler)?;

        debug!(logger, "Updating feedback..."; "changes" => ?changes);
        let feedback = environment
            .db
            .update(&id, changes)
            .await
            .map_err(error_handler)?;

        json(&feedback)
    }
}

pub async fn delete(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: FeedbackError| Rejection::new(Context::delete(id.clone()), e);

        let id = decode_id(&id).map_err(error_handler)?;
        let logger = environment.logger.new(o!(
            "request_id" => Uuid::new_v4().to_string(),
            "id" => id.clone()
        ));

        debug!(logger, "Deleting feedback...");
        environment.db.delete(&id).await.map_err(error_handler)?;

        StatusCode::NO_CONTENT
    }
}

pub async fn duplicates(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: FeedbackError| Rejection::new(Context::duplicates(id.clone()), e);

        let id = decode_id(&id).map_err(error_handler)?;
        debug!(environment.logger, "Searching for duplicates..."; "id" => &id);

        let duplicates = environment.db.duplicates(&id).await.map_err(error_handler)?;
        let response = SuccessResponse::Duplicates { id, duplicates };

        with_status(json(&response), StatusCode::OK)
    }
}

pub async fn admin_config(environment: Environment) -> RouteResult {
    timed! {
        json(&*environment.admin)
    }
}

/// Path segments arrive percent-encoded.
fn decode_id(raw: &str) -> Result<String, FeedbackError> {
    urlencoding::decode(raw)
        .map(|id| id.into_owned())
        .map_err(|_| FeedbackError::InvalidId(raw.to_owned()))
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
