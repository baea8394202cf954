use futures::future::BoxFuture;
use futures::stream::BoxStream;

use crate::errors::FeedbackError;
use crate::feedback::{Feedback, FeedbackChanges, FeedbackDetail, FeedbackSummary, NewFeedback};
use crate::query::ListQuery;

pub mod memory;

/// The feedback store. Every call is atomic with respect to the others;
/// there are no multi-call transactions.
pub trait Db {
    /// Validates and stores a new record, stamping both times with the
    /// current time.
    fn create(&self, feedback: NewFeedback) -> BoxFuture<Result<Feedback, FeedbackError>>;

    /// Validates and applies a partial update, refreshing `updated_at`.
    fn update(
        &self,
        id: &str,
        changes: FeedbackChanges,
    ) -> BoxFuture<Result<Feedback, FeedbackError>>;

    /// Removes a record. Records that pointed at it as a duplicate lose
    /// the reference.
    fn delete(&self, id: &str) -> BoxFuture<Result<(), FeedbackError>>;

    /// Retrieves a record and the summary of the record it duplicates.
    fn retrieve(&self, id: &str) -> BoxFuture<Result<FeedbackDetail, FeedbackError>>;

    /// Lists the records marked as duplicates of the given one.
    fn duplicates(&self, id: &str) -> BoxFuture<Result<Vec<FeedbackSummary>, FeedbackError>>;

    /// Streams the matching records. Each call starts a fresh pass.
    fn list(&self, query: ListQuery) -> BoxStream<Result<Feedback, FeedbackError>>;

    /// Counts the records `list` would return, ignoring paging.
    fn count(&self, query: ListQuery) -> BoxFuture<Result<i64, FeedbackError>>;
}

pub use self::postgres::*;

mod postgres {
    use async_stream::try_stream;
    use futures::future::BoxFuture;
    use futures::stream::BoxStream;
    use futures::{FutureExt, StreamExt, TryStreamExt};
    use sqlx::{
        self,
        postgres::{PgArguments, PgPool, PgRow},
        query::Query,
        Postgres,
    };
    use time::OffsetDateTime;

    use crate::errors::{FeedbackError, ValidationError};
    use crate::feedback::{
        Feedback, FeedbackChanges, FeedbackDetail, FeedbackSummary, NewFeedback, Priority, Status,
        Times,
    };
    use crate::query::ListQuery;

    const FEEDBACK_ID_CONSTRAINT: &str = "feedback_pkey";
    const FEEDBACK_DUPLICATE_OF_CONSTRAINT: &str = "feedback_duplicate_of_fkey";
    const FEEDBACK_NOT_OWN_DUPLICATE_CONSTRAINT: &str = "feedback_not_own_duplicate";

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn create(&self, feedback: NewFeedback) -> BoxFuture<Result<Feedback, FeedbackError>> {
            async move {
                let draft = feedback.validate()?;

                let query = sqlx::query_as(include_str!("queries/create.sql"));

                let (created_at, updated_at): (OffsetDateTime, OffsetDateTime) = query
                    .bind(&draft.id)
                    .bind(&draft.description)
                    .bind(&draft.location)
                    .bind(&draft.category)
                    .bind(&draft.user_email)
                    .bind(draft.status.as_str())
                    .bind(draft.priority.as_str())
                    .bind(draft.manual_review)
                    .bind(&draft.duplicate_of)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error(e, &draft.id, draft.duplicate_of.as_deref()))?;

                Ok(Feedback::from_draft(
                    draft,
                    Times {
                        created_at,
                        updated_at,
                    },
                ))
            }
            .boxed()
        }

        fn update(
            &self,
            id: &str,
            changes: FeedbackChanges,
        ) -> BoxFuture<Result<Feedback, FeedbackError>> {
            let id = id.to_owned();

            async move {
                let changes = changes.validate(&id)?;

                let query = sqlx::query(include_str!("queries/update.sql"));

                let feedback: Option<Feedback> = query
                    .bind(&id)
                    .bind(&changes.description)
                    .bind(&changes.location)
                    .bind(changes.category.is_some())
                    .bind(changes.category.clone().flatten())
                    .bind(changes.user_email.is_some())
                    .bind(changes.user_email.clone().flatten())
                    .bind(changes.status.map(Status::as_str))
                    .bind(changes.priority.map(Priority::as_str))
                    .bind(changes.manual_review)
                    .bind(changes.duplicate_of.is_some())
                    .bind(changes.duplicate_of.clone().flatten())
                    .try_map(|row: PgRow| feedback_from_row(&row))
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error(e, &id, changes.new_duplicate_target()))?;

                feedback.ok_or_else(|| FeedbackError::not_found(id))
            }
            .boxed()
        }

        fn delete(&self, id: &str) -> BoxFuture<Result<(), FeedbackError>> {
            let id = id.to_owned();

            async move {
                // the foreign key clears `duplicate_of` on referring rows
                let query = sqlx::query(include_str!("queries/delete.sql"));

                let count = query
                    .bind(&id)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error(e, &id, None))?
                    .rows_affected();

                if count == 0 {
                    Err(FeedbackError::not_found(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }

        fn retrieve(&self, id: &str) -> BoxFuture<Result<FeedbackDetail, FeedbackError>> {
            let id = id.to_owned();

            async move {
                let query = sqlx::query(include_str!("queries/retrieve.sql"));

                let detail: Option<FeedbackDetail> = query
                    .bind(&id)
                    .try_map(|row: PgRow| {
                        let feedback = feedback_from_row(&row)?;

                        let duplicate = match &feedback.duplicate_of {
                            Some(duplicate_id) => {
                                let location: String = try_get(&row, "duplicate_location")?;
                                let status: String = try_get(&row, "duplicate_status")?;

                                Some(FeedbackSummary {
                                    id: duplicate_id.clone(),
                                    location,
                                    status: decode_choice(Status::parse("status", &status))?,
                                })
                            }
                            None => None,
                        };

                        Ok(FeedbackDetail {
                            feedback,
                            duplicate,
                        })
                    })
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error(e, &id, None))?;

                detail.ok_or_else(|| FeedbackError::not_found(id))
            }
            .boxed()
        }

        fn duplicates(&self, id: &str) -> BoxFuture<Result<Vec<FeedbackSummary>, FeedbackError>> {
            let id = id.to_owned();

            async move {
                let (exists,): (bool,) = sqlx::query_as(include_str!("queries/exists.sql"))
                    .bind(&id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error(e, &id, None))?;

                if !exists {
                    return Err(FeedbackError::not_found(id));
                }

                let query = sqlx::query(include_str!("queries/retrieve_duplicates.sql"));

                let duplicates = query
                    .bind(&id)
                    .try_map(|row: PgRow| {
                        let status: String = try_get(&row, "status")?;

                        Ok(FeedbackSummary {
                            id: try_get(&row, "id")?,
                            location: try_get(&row, "location")?,
                            status: decode_choice(Status::parse("status", &status))?,
                        })
                    })
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error(e, &id, None))?;

                Ok(duplicates)
            }
            .boxed()
        }

        fn list(&self, query: ListQuery) -> BoxStream<Result<Feedback, FeedbackError>> {
            let pool = self.pool.clone();

            let stream = try_stream! {
                let sql = format!(
                    "{} {} ORDER BY {} LIMIT $8 OFFSET $9",
                    include_str!("queries/list.sql"),
                    include_str!("queries/filters.sql"),
                    query.ordering.to_sql(),
                );

                let mut rows = bind_filters(sqlx::query(&sql), &query)
                    .bind(query.page.limit.map(i64::from))
                    .bind(i64::from(query.page.offset))
                    .try_map(|row: PgRow| feedback_from_row(&row))
                    .fetch(&pool);

                while let Some(feedback) = rows.try_next().await.map_err(|e| FeedbackError::Sqlx { source: e })? {
                    yield feedback;
                }
            };

            stream.boxed()
        }

        fn count(&self, query: ListQuery) -> BoxFuture<Result<i64, FeedbackError>> {
            async move {
                let sql = format!(
                    "{} {}",
                    include_str!("queries/count.sql"),
                    include_str!("queries/filters.sql"),
                );

                let (count,): (i64,) = bind_filters(sqlx::query(&sql), &query)
                    .try_map(|row: PgRow| Ok((try_get(&row, 0usize)?,)))
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| FeedbackError::Sqlx { source: e })?;

                Ok(count)
            }
            .boxed()
        }
    }

    /// Binds the seven filter parameters shared by listing and counting.
    fn bind_filters<'q>(
        query: Query<'q, Postgres, PgArguments>,
        list: &ListQuery,
    ) -> Query<'q, Postgres, PgArguments> {
        let filters = &list.filters;

        query
            .bind(filters.status.map(Status::as_str))
            .bind(filters.priority.map(Priority::as_str))
            .bind(filters.category.clone())
            .bind(filters.manual_review)
            .bind(filters.created.after)
            .bind(filters.created.before)
            .bind(list.search_key())
    }

    fn feedback_from_row(row: &PgRow) -> Result<Feedback, sqlx::Error> {
        let status: String = try_get(row, "status")?;
        let priority: String = try_get(row, "priority")?;

        Ok(Feedback {
            id: try_get(row, "id")?,
            description: try_get(row, "description")?,
            location: try_get(row, "location")?,
            category: try_get(row, "category")?,
            user_email: try_get(row, "user_email")?,
            // the check constraints make these failures unlikely, but
            // the column is still plain text
            status: decode_choice(Status::parse("status", &status))?,
            priority: decode_choice(Priority::parse("priority", &priority))?,
            manual_review: try_get(row, "manual_review")?,
            duplicate_of: try_get(row, "duplicate_of")?,
            times: Times {
                created_at: try_get(row, "created_at")?,
                updated_at: try_get(row, "updated_at")?,
            },
        })
    }

    fn decode_choice<T>(result: Result<T, ValidationError>) -> Result<T, sqlx::Error> {
        result.map_err(|e| sqlx::Error::Decode(Box::new(e)))
    }

    fn try_get<'a, T, I>(row: &'a PgRow, column: I) -> Result<T, sqlx::Error>
    where
        T: sqlx::Type<sqlx::Postgres> + sqlx::decode::Decode<'a, sqlx::Postgres>,
        I: sqlx::ColumnIndex<PgRow>,
    {
        use sqlx::prelude::*;

        row.try_get(column)
    }

    fn map_sqlx_error(error: sqlx::Error, id: &str, duplicate_of: Option<&str>) -> FeedbackError {
        use sqlx::Error;

        match error {
            Error::Database(ref e) if e.constraint() == Some(FEEDBACK_ID_CONSTRAINT) => {
                ValidationError::DuplicateId { id: id.to_owned() }.into()
            }
            Error::Database(ref e) if e.constraint() == Some(FEEDBACK_DUPLICATE_OF_CONSTRAINT) => {
                FeedbackError::dangling_duplicate(duplicate_of.unwrap_or_default())
            }
            Error::Database(ref e)
                if e.constraint() == Some(FEEDBACK_NOT_OWN_DUPLICATE_CONSTRAINT) =>
            {
                ValidationError::SelfReference.into()
            }
            _ => FeedbackError::Sqlx { source: error },
        }
    }
}
