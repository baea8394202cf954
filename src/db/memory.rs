use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, BoxStream, StreamExt};
use time::OffsetDateTime;

use crate::db::Db;
use crate::errors::{FeedbackError, ValidationError};
use crate::feedback::{Feedback, FeedbackChanges, FeedbackDetail, FeedbackSummary, NewFeedback, Times};
use crate::query::ListQuery;

pub type Clock = dyn Fn() -> OffsetDateTime + Send + Sync;

/// A store that keeps its records in memory. One lock guards the whole
/// map, so every operation is atomic.
pub struct MemoryDb {
    records: RwLock<HashMap<String, Feedback>>,
    clock: Box<Clock>,
}

impl Default for MemoryDb {
    fn default() -> Self {
        MemoryDb::with_clock(OffsetDateTime::now_utc)
    }
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that reads the time from `clock`.
    pub fn with_clock(clock: impl Fn() -> OffsetDateTime + Send + Sync + 'static) -> Self {
        MemoryDb {
            records: RwLock::new(HashMap::new()),
            clock: Box::new(clock),
        }
    }

    fn read(&self) -> RwLockReadGuard<HashMap<String, Feedback>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<HashMap<String, Feedback>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, feedback: NewFeedback) -> Result<Feedback, FeedbackError> {
        let draft = feedback.validate()?;
        let mut records = self.write();

        if records.contains_key(&draft.id) {
            return Err(ValidationError::DuplicateId { id: draft.id }.into());
        }

        if let Some(target) = &draft.duplicate_of {
            if !records.contains_key(target) {
                return Err(FeedbackError::dangling_duplicate(target.as_str()));
            }
        }

        let feedback = Feedback::from_draft(draft, Times::created((self.clock)()));
        records.insert(feedback.id.clone(), feedback.clone());

        Ok(feedback)
    }

    fn change(&self, id: &str, changes: FeedbackChanges) -> Result<Feedback, FeedbackError> {
        let changes = changes.validate(id)?;
        let mut records = self.write();

        if !records.contains_key(id) {
            return Err(FeedbackError::not_found(id));
        }

        if let Some(target) = changes.new_duplicate_target() {
            if !records.contains_key(target) {
                return Err(FeedbackError::dangling_duplicate(target));
            }
        }

        let now = (self.clock)();
        let feedback = records
            .get_mut(id)
            .ok_or_else(|| FeedbackError::not_found(id))?;

        feedback.apply(&changes);
        feedback.times.touch(now);

        Ok(feedback.clone())
    }

    fn remove(&self, id: &str) -> Result<(), FeedbackError> {
        let mut records = self.write();

        records
            .remove(id)
            .ok_or_else(|| FeedbackError::not_found(id))?;

        for other in records.values_mut() {
            if other.duplicate_of.as_deref() == Some(id) {
                other.duplicate_of = None;
            }
        }

        Ok(())
    }

    fn detail(&self, id: &str) -> Result<FeedbackDetail, FeedbackError> {
        let records = self.read();

        let feedback = records
            .get(id)
            .cloned()
            .ok_or_else(|| FeedbackError::not_found(id))?;
        let duplicate = feedback
            .duplicate_of
            .as_ref()
            .and_then(|target| records.get(target))
            .map(Feedback::summary);

        Ok(FeedbackDetail {
            feedback,
            duplicate,
        })
    }

    fn referrers(&self, id: &str) -> Result<Vec<FeedbackSummary>, FeedbackError> {
        let records = self.read();

        if !records.contains_key(id) {
            return Err(FeedbackError::not_found(id));
        }

        let mut referrers = records
            .values()
            .filter(|f| f.duplicate_of.as_deref() == Some(id))
            .collect::<Vec<_>>();
        referrers.sort_by(|a, b| ListQuery::default().ordering.compare(a, b));

        Ok(referrers.into_iter().map(Feedback::summary).collect())
    }

    fn matching(&self, query: &ListQuery) -> Vec<Feedback> {
        let records = self.read();

        let mut matching = records
            .values()
            .filter(|f| query.matches(f))
            .cloned()
            .collect::<Vec<_>>();
        matching.sort_by(|a, b| query.ordering.compare(a, b));

        let offset = query.page.offset as usize;
        let limit = query.page.limit.map_or(usize::MAX, |l| l as usize);

        matching.into_iter().skip(offset).take(limit).collect()
    }
}

impl Db for MemoryDb {
    fn create(&self, feedback: NewFeedback) -> BoxFuture<Result<Feedback, FeedbackError>> {
        future::ready(self.insert(feedback)).boxed()
    }

    fn update(
        &self,
        id: &str,
        changes: FeedbackChanges,
    ) -> BoxFuture<Result<Feedback, FeedbackError>> {
        future::ready(self.change(id, changes)).boxed()
    }

    fn delete(&self, id: &str) -> BoxFuture<Result<(), FeedbackError>> {
        future::ready(self.remove(id)).boxed()
    }

    fn retrieve(&self, id: &str) -> BoxFuture<Result<FeedbackDetail, FeedbackError>> {
        future::ready(self.detail(id)).boxed()
    }

    fn duplicates(&self, id: &str) -> BoxFuture<Result<Vec<FeedbackSummary>, FeedbackError>> {
        future::ready(self.referrers(id)).boxed()
    }

    fn list(&self, query: ListQuery) -> BoxStream<Result<Feedback, FeedbackError>> {
        // the snapshot is taken when the stream is first polled
        stream::once(async move { stream::iter(self.matching(&query).into_iter().map(Ok)) })
            .flatten()
            .boxed()
    }

    fn count(&self, query: ListQuery) -> BoxFuture<Result<i64, FeedbackError>> {
        let count = self.read().values().filter(|f| query.matches(f)).count();

        future::ready(Ok(count as i64)).boxed()
    }
}
