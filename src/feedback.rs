use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::errors::{FeedbackError, ValidationError};
use crate::normalization::{self, char_length};

pub const ID_MAX_LENGTH: usize = 50;
pub const LOCATION_MAX_LENGTH: usize = 255;
pub const CATEGORY_MAX_LENGTH: usize = 100;
pub const USER_EMAIL_MAX_LENGTH: usize = 255;

/// Where a feedback report is in its workflow.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Open,
        Status::InProgress,
        Status::Resolved,
        Status::Closed,
    ];

    /// The value stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::InProgress => "in_progress",
            Status::Resolved => "resolved",
            Status::Closed => "closed",
        }
    }

    /// The human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::InProgress => "In Progress",
            Status::Resolved => "Resolved",
            Status::Closed => "Closed",
        }
    }

    pub fn parse(field: &'static str, value: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| ValidationError::InvalidChoice {
                field,
                value: value.to_owned(),
            })
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Open
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::parse("status", s)
    }
}

/// How urgently a feedback report needs attention.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    /// The value stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    /// The human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }

    pub fn parse(field: &'static str, value: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == value)
            .ok_or_else(|| ValidationError::InvalidChoice {
                field,
                value: value.to_owned(),
            })
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Low
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::parse("priority", s)
    }
}

/// The times a record was created and last modified.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Times {
    /// The date and time it was created.
    #[serde(with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,

    /// The date and time it was last modified.
    #[serde(with = "time::serde::timestamp")]
    pub updated_at: OffsetDateTime,
}

impl Times {
    /// Stamps a new record.
    pub fn created(now: OffsetDateTime) -> Self {
        Times {
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at` without ever letting it fall behind
    /// `created_at`.
    pub fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = if now < self.created_at {
            self.created_at
        } else {
            now
        };
    }
}

/// A single feedback report in the store.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Feedback {
    /// The caller-supplied ID.
    pub id: String,

    /// What was reported.
    pub description: String,

    /// Where the problem is.
    pub location: String,

    /// The kind of work it needs, if known.
    pub category: Option<String>,

    /// Who to tell about progress, if anyone.
    pub user_email: Option<String>,

    pub status: Status,

    pub priority: Priority,

    /// Whether a person must look at it before it is routed.
    pub manual_review: bool,

    /// The ID of the report this one repeats, if any.
    pub duplicate_of: Option<String>,

    #[serde(flatten)]
    pub times: Times,
}

impl Feedback {
    pub(crate) fn from_draft(draft: Draft, times: Times) -> Self {
        Feedback {
            id: draft.id,
            description: draft.description,
            location: draft.location,
            category: draft.category,
            user_email: draft.user_email,
            status: draft.status,
            priority: draft.priority,
            manual_review: draft.manual_review,
            duplicate_of: draft.duplicate_of,
            times,
        }
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.times.created_at
    }

    pub fn updated_at(&self) -> OffsetDateTime {
        self.times.updated_at
    }

    pub fn summary(&self) -> FeedbackSummary {
        FeedbackSummary {
            id: self.id.clone(),
            location: self.location.clone(),
            status: self.status,
        }
    }

    /// Applies validated changes in place, leaving `times` alone.
    pub(crate) fn apply(&mut self, changes: &ValidChanges) {
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(location) = &changes.location {
            self.location = location.clone();
        }
        if let Some(category) = &changes.category {
            self.category = category.clone();
        }
        if let Some(user_email) = &changes.user_email {
            self.user_email = user_email.clone();
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(manual_review) = changes.manual_review {
            self.manual_review = manual_review;
        }
        if let Some(duplicate_of) = &changes.duplicate_of {
            self.duplicate_of = duplicate_of.clone();
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.id, self.location, self.status)
    }
}

/// A minimal view of a record, used for the targets and sources of
/// duplicate references.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FeedbackSummary {
    pub id: String,
    pub location: String,
    pub status: Status,
}

/// A record together with the resolved target of its `duplicate_of`
/// reference.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FeedbackDetail {
    #[serde(flatten)]
    pub feedback: Feedback,

    /// The record named by `duplicate_of`.
    pub duplicate: Option<FeedbackSummary>,
}

/// A submission for a new record, before validation. Enumerated fields
/// are kept as text so that unknown values are reported against their
/// field rather than as a parse failure of the whole document.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct NewFeedback {
    #[serde(default, deserialize_with = "normalization::deserialize")]
    pub id: String,

    #[serde(default, deserialize_with = "normalization::deserialize")]
    pub description: String,

    #[serde(default, deserialize_with = "normalization::deserialize")]
    pub location: String,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    pub user_email: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub priority: Option<String>,

    #[serde(default)]
    pub manual_review: Option<bool>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    pub duplicate_of: Option<String>,
}

impl NewFeedback {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        NewFeedback {
            id: id.into(),
            description: description.into(),
            location: location.into(),
            ..Default::default()
        }
    }

    /// Interprets a JSON document as a submission.
    pub fn from_json(value: serde_json::Value) -> Result<Self, FeedbackError> {
        expect_object(&value)?;

        serde_json::from_value(value).map_err(|source| FeedbackError::MalformedInput { source })
    }

    /// Checks every field, normalizing text and filling in defaults.
    /// Whether `id` is free and `duplicate_of` exists can only be
    /// answered by the store.
    pub fn validate(self) -> Result<Draft, FeedbackError> {
        let id = required("id", &self.id, Some(ID_MAX_LENGTH))?;
        let description = required("description", &self.description, None)?;
        let location = required("location", &self.location, Some(LOCATION_MAX_LENGTH))?;
        let category = optional("category", self.category, CATEGORY_MAX_LENGTH)?;
        let user_email = email(self.user_email)?;

        let status = match self.status {
            Some(s) => Status::parse("status", &s)?,
            None => Status::default(),
        };
        let priority = match self.priority {
            Some(p) => Priority::parse("priority", &p)?,
            None => Priority::default(),
        };

        let duplicate_of = normalization::normalize_optional(self.duplicate_of);
        if duplicate_of.as_deref() == Some(id.as_str()) {
            return Err(ValidationError::SelfReference.into());
        }

        Ok(Draft {
            id,
            description,
            location,
            category,
            user_email,
            status,
            priority,
            manual_review: self.manual_review.unwrap_or(false),
            duplicate_of,
        })
    }
}

/// A validated submission, ready to be stored.
#[derive(Clone, Debug, PartialEq)]
pub struct Draft {
    pub id: String,
    pub description: String,
    pub location: String,
    pub category: Option<String>,
    pub user_email: Option<String>,
    pub status: Status,
    pub priority: Priority,
    pub manual_review: bool,
    pub duplicate_of: Option<String>,
}

/// A partial update. A missing field is left unchanged; for nullable
/// fields, `Some(None)` clears the value. There is no way
/// to express a change to `id` or the timestamps.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FeedbackChanges {
    #[serde(default, deserialize_with = "normalization::deserialize_change_required")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_change_required")]
    pub location: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_change")]
    pub category: Option<Option<String>>,

    #[serde(default, deserialize_with = "normalization::deserialize_change")]
    pub user_email: Option<Option<String>>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub priority: Option<String>,

    #[serde(default)]
    pub manual_review: Option<bool>,

    #[serde(default, deserialize_with = "normalization::deserialize_change")]
    pub duplicate_of: Option<Option<String>>,
}

/// Fields that are set by the store and never by a caller.
pub const READ_ONLY_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Fields that always hold a value, so an update may not set them to
/// `null`.
const NON_NULLABLE_FIELDS: [&str; 5] = [
    "description",
    "location",
    "status",
    "priority",
    "manual_review",
];

/// Submissions and updates are JSON objects; anything else is
/// malformed, even if serde could read it positionally.
fn expect_object(
    value: &serde_json::Value,
) -> Result<&serde_json::Map<String, serde_json::Value>, FeedbackError> {
    use serde::de::Error;

    value.as_object().ok_or_else(|| FeedbackError::MalformedInput {
        source: serde_json::Error::custom("expected a JSON object"),
    })
}

impl FeedbackChanges {
    /// Interprets a JSON document as a partial update, rejecting
    /// attempts to change read-only fields.
    pub fn from_json(value: serde_json::Value) -> Result<Self, FeedbackError> {
        let object = expect_object(&value)?;

        if let Some(field) = READ_ONLY_FIELDS.iter().find(|f| object.contains_key(**f)) {
            return Err(ValidationError::ReadOnly { field: *field }.into());
        }

        if let Some(field) = NON_NULLABLE_FIELDS
            .iter()
            .find(|f| object.get(**f).map_or(false, serde_json::Value::is_null))
        {
            return Err(ValidationError::Missing { field: *field }.into());
        }

        serde_json::from_value(value).map_err(|source| FeedbackError::MalformedInput { source })
    }

    pub fn status(status: Status) -> Self {
        FeedbackChanges {
            status: Some(status.as_str().to_owned()),
            ..Default::default()
        }
    }

    pub fn priority(priority: Priority) -> Self {
        FeedbackChanges {
            priority: Some(priority.as_str().to_owned()),
            ..Default::default()
        }
    }

    pub fn duplicate_of(id: Option<impl Into<String>>) -> Self {
        FeedbackChanges {
            duplicate_of: Some(id.map(Into::into)),
            ..Default::default()
        }
    }

    /// Checks every supplied field against the same rules as creation.
    pub fn validate(self, id: &str) -> Result<ValidChanges, FeedbackError> {
        let description = match self.description {
            Some(d) => Some(required("description", &d, None)?),
            None => None,
        };
        let location = match self.location {
            Some(l) => Some(required("location", &l, Some(LOCATION_MAX_LENGTH))?),
            None => None,
        };
        let category = match self.category {
            Some(c) => Some(optional("category", c, CATEGORY_MAX_LENGTH)?),
            None => None,
        };
        let user_email = match self.user_email {
            Some(e) => Some(email(e)?),
            None => None,
        };
        let status = match self.status {
            Some(s) => Some(Status::parse("status", &s)?),
            None => None,
        };
        let priority = match self.priority {
            Some(p) => Some(Priority::parse("priority", &p)?),
            None => None,
        };
        let duplicate_of = self.duplicate_of.map(normalization::normalize_optional);
        if let Some(Some(target)) = &duplicate_of {
            if target == id {
                return Err(ValidationError::SelfReference.into());
            }
        }

        Ok(ValidChanges {
            description,
            location,
            category,
            user_email,
            status,
            priority,
            manual_review: self.manual_review,
            duplicate_of,
        })
    }
}

/// A validated partial update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidChanges {
    pub description: Option<String>,
    pub location: Option<String>,
    pub category: Option<Option<String>>,
    pub user_email: Option<Option<String>>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub manual_review: Option<bool>,
    pub duplicate_of: Option<Option<String>>,
}

impl ValidChanges {
    /// The new duplicate target, if the update sets one.
    pub fn new_duplicate_target(&self) -> Option<&str> {
        match &self.duplicate_of {
            Some(Some(target)) => Some(target.as_str()),
            _ => None,
        }
    }
}

fn required(
    field: &'static str,
    value: &str,
    max: Option<usize>,
) -> Result<String, ValidationError> {
    let value = normalization::normalize_text(value);

    if value.is_empty() {
        return Err(ValidationError::Missing { field });
    }

    match max {
        Some(max) if char_length(&value) > max => Err(ValidationError::TooLong { field, max }),
        _ => Ok(value),
    }
}

fn optional(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match normalization::normalize_optional(value) {
        Some(value) if char_length(&value) > max => Err(ValidationError::TooLong { field, max }),
        value => Ok(value),
    }
}

fn email(value: Option<String>) -> Result<Option<String>, ValidationError> {
    const FIELD: &str = "user_email";

    let value = optional(FIELD, value, USER_EMAIL_MAX_LENGTH)?;

    match value {
        Some(ref address) if !is_valid_email_address(address) => {
            Err(ValidationError::MalformedEmail { field: FIELD })
        }
        value => Ok(value),
    }
}

/// Checks the shape of an email address: one `@`, a non-empty local
/// part, no whitespace, and a dotted domain that does not start or end
/// with a dot.
pub fn is_valid_email_address(value: &str) -> bool {
    if value.is_empty() || value.contains(char::is_whitespace) {
        return false;
    }

    let mut parts = value.split('@');
    let local = parts.next().unwrap_or("");
    let domain = match parts.next() {
        Some(d) => d,
        None => return false,
    };

    if parts.next().is_some() || local.is_empty() || domain.is_empty() {
        return false;
    }

    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return false;
    }

    domain.contains('.')
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn submission() -> NewFeedback {
        NewFeedback {
            category: Some("PLUMBING REPAIR".to_owned()),
            user_email: Some("facilities@example.edu".to_owned()),
            ..NewFeedback::new("FB-1", "Leaking tap", "Building 4, Room 101")
        }
    }

    #[test]
    fn defaults_are_filled_in() {
        let draft = NewFeedback::new("FB-1", "Broken door", "Lobby")
            .validate()
            .expect("validate submission");

        assert_eq!(draft.status, Status::Open);
        assert_eq!(draft.priority, Priority::Low);
        assert!(!draft.manual_review);
        assert_eq!(draft.category, None);
        assert_eq!(draft.duplicate_of, None);
    }

    #[test]
    fn unknown_choices_are_rejected() {
        let e = NewFeedback {
            status: Some("bogus".to_owned()),
            ..submission()
        }
        .validate()
        .unwrap_err();

        assert!(matches!(
            e,
            FeedbackError::Validation(ValidationError::InvalidChoice { field: "status", .. })
        ));

        let e = NewFeedback {
            priority: Some("urgent".to_owned()),
            ..submission()
        }
        .validate()
        .unwrap_err();

        assert_eq!(e.field(), Some("priority"));
    }

    #[test]
    fn required_fields_must_not_be_blank() {
        for (submission, field) in vec![
            (NewFeedback::new("  ", "x", "y"), "id"),
            (NewFeedback::new("FB-1", "", "y"), "description"),
            (NewFeedback::new("FB-1", "x", "\t"), "location"),
        ] {
            let e = submission.validate().unwrap_err();
            assert!(
                matches!(e, FeedbackError::Validation(ValidationError::Missing { .. })),
                "{:?}",
                e
            );
            assert_eq!(e.field(), Some(field));
        }
    }

    #[test]
    fn lengths_are_counted_in_characters() {
        let fifty = "é".repeat(ID_MAX_LENGTH);
        assert!(NewFeedback::new(fifty.clone(), "x", "y").validate().is_ok());

        let e = NewFeedback::new(format!("{}a", fifty), "x", "y")
            .validate()
            .unwrap_err();
        assert!(matches!(
            e,
            FeedbackError::Validation(ValidationError::TooLong { field: "id", max: 50 })
        ));

        let e = NewFeedback {
            category: Some("c".repeat(CATEGORY_MAX_LENGTH + 1)),
            ..submission()
        }
        .validate()
        .unwrap_err();
        assert_eq!(e.field(), Some("category"));
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for address in &["nobody", "a@b", "a@.com", "a@b.", "a b@c.com", "a@@b.com", "@b.com"] {
            let e = NewFeedback {
                user_email: Some((*address).to_owned()),
                ..submission()
            }
            .validate()
            .unwrap_err();

            assert_eq!(e.field(), Some("user_email"), "{}", address);
        }

        let draft = NewFeedback {
            user_email: Some("  ".to_owned()),
            ..submission()
        }
        .validate()
        .expect("blank email is absent");
        assert_eq!(draft.user_email, None);
    }

    #[test]
    fn self_references_are_rejected() {
        let e = NewFeedback {
            duplicate_of: Some("FB-1".to_owned()),
            ..submission()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(
            e,
            FeedbackError::Validation(ValidationError::SelfReference)
        ));

        let e = FeedbackChanges::duplicate_of(Some("FB-1"))
            .validate("FB-1")
            .unwrap_err();
        assert_eq!(e.field(), Some("duplicate_of"));
    }

    #[test]
    fn read_only_fields_cannot_be_changed() {
        for field in READ_ONLY_FIELDS.iter() {
            let mut body = serde_json::Map::new();
            body.insert((*field).to_owned(), serde_json::json!("x"));
            body.insert("status".to_owned(), serde_json::json!("closed"));

            let e = FeedbackChanges::from_json(serde_json::Value::Object(body)).unwrap_err();
            assert!(matches!(
                e,
                FeedbackError::Validation(ValidationError::ReadOnly { .. })
            ));
            assert_eq!(e.field(), Some(*field));
        }
    }

    #[test]
    fn null_clears_and_missing_leaves_alone() {
        let changes = FeedbackChanges::from_json(serde_json::json!({
            "category": null,
            "status": "in_progress",
        }))
        .expect("parse changes")
        .validate("FB-1")
        .expect("validate changes");

        assert_eq!(changes.category, Some(None));
        assert_eq!(changes.user_email, None);
        assert_eq!(changes.duplicate_of, None);
        assert_eq!(changes.status, Some(Status::InProgress));
    }

    #[test]
    fn null_is_refused_for_fields_that_always_hold_a_value() {
        for field in &["status", "priority", "manual_review", "description", "location"] {
            let mut changes = serde_json::Map::new();
            changes.insert((*field).to_owned(), serde_json::Value::Null);

            match FeedbackChanges::from_json(serde_json::Value::Object(changes)) {
                Err(FeedbackError::Validation(ValidationError::Missing { field: f })) => {
                    assert_eq!(f, *field)
                }
                other => panic!("expected {} to be required, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn documents_must_be_objects() {
        let e = FeedbackChanges::from_json(serde_json::json!(["replaced description", "moved"]))
            .unwrap_err();
        assert!(matches!(e, FeedbackError::MalformedInput { .. }));

        let e = NewFeedback::from_json(serde_json::json!(["FB-2", "desc", "loc"])).unwrap_err();
        assert!(matches!(e, FeedbackError::MalformedInput { .. }));

        let submission = NewFeedback::from_json(serde_json::json!({
            "id": "FB-2",
            "description": "desc",
            "location": "loc",
        }))
        .expect("parse submission");
        assert_eq!(submission.id, "FB-2");
    }

    #[test]
    fn unknown_change_fields_are_malformed() {
        let e = FeedbackChanges::from_json(serde_json::json!({ "stauts": "closed" }))
            .unwrap_err();
        assert!(matches!(e, FeedbackError::MalformedInput { .. }));
    }

    #[test]
    fn wrongly_typed_changes_are_malformed() {
        let e = FeedbackChanges::from_json(serde_json::json!({ "manual_review": "yes" }))
            .unwrap_err();
        assert!(matches!(e, FeedbackError::MalformedInput { .. }));
    }

    #[test]
    fn display_matches_admin_listing() {
        let draft = submission().validate().expect("validate submission");
        let now = OffsetDateTime::now_utc();
        let feedback = Feedback::from_draft(draft, Times::created(now));

        assert_eq!(feedback.to_string(), "FB-1 - Building 4, Room 101 (open)");
    }

    #[test]
    fn touching_never_goes_backwards() {
        let now = OffsetDateTime::now_utc();
        let mut times = Times::created(now);

        times.touch(now - time::Duration::seconds(5));
        assert_eq!(times.updated_at, times.created_at);

        times.touch(now + time::Duration::seconds(5));
        assert!(times.updated_at > times.created_at);
    }

    proptest! {
        #[test]
        fn choices_parse_only_their_own_values(value in "[a-z_]{0,12}") {
            let valid_status = Status::ALL.iter().any(|s| s.as_str() == value);
            prop_assert_eq!(value.parse::<Status>().is_ok(), valid_status);

            let valid_priority = Priority::ALL.iter().any(|p| p.as_str() == value);
            prop_assert_eq!(value.parse::<Priority>().is_ok(), valid_priority);
        }

        #[test]
        fn well_formed_addresses_are_accepted(local in "[a-z0-9._+-]{1,20}", host in "[a-z0-9-]{1,20}", tld in "[a-z]{2,6}") {
            let address = format!("{}@{}.{}", local, host, tld);
            prop_assert!(is_valid_email_address(&address), "{} is valid", address);
        }
    }
}
