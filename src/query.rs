//! Filtering, searching, ordering and paging of feedback lists.

use std::cmp;
use std::fmt;
use std::str::FromStr;

use time::{Duration, OffsetDateTime, UtcOffset};

use crate::errors::ValidationError;
use crate::feedback::{Feedback, Priority, Status};
use crate::normalization::normalize_text;

/// The discrete filters the admin list offers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filters {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub manual_review: Option<bool>,
    pub created: CreatedRange,
}

impl Filters {
    pub fn matches(&self, feedback: &Feedback) -> bool {
        self.status.map_or(true, |s| feedback.status == s)
            && self.priority.map_or(true, |p| feedback.priority == p)
            && self
                .category
                .as_ref()
                .map_or(true, |c| feedback.category.as_ref() == Some(c))
            && self
                .manual_review
                .map_or(true, |m| feedback.manual_review == m)
            && self.created.contains(feedback.created_at())
    }
}

/// A half-open range of creation times: `after` is inclusive and
/// `before` is exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CreatedRange {
    pub after: Option<OffsetDateTime>,
    pub before: Option<OffsetDateTime>,
}

impl CreatedRange {
    pub fn contains(&self, t: OffsetDateTime) -> bool {
        self.after.map_or(true, |a| t >= a) && self.before.map_or(true, |b| t < b)
    }

    /// Narrows this range to its intersection with `other`.
    pub fn intersect(self, other: CreatedRange) -> CreatedRange {
        let after = match (self.after, other.after) {
            (Some(a), Some(b)) => Some(cmp::max(a, b)),
            (a, b) => a.or(b),
        };
        let before = match (self.before, other.before) {
            (Some(a), Some(b)) => Some(cmp::min(a, b)),
            (a, b) => a.or(b),
        };

        CreatedRange { after, before }
    }

    /// The range covered by one of the admin date presets, in UTC.
    pub fn preset(preset: DatePreset, now: OffsetDateTime) -> CreatedRange {
        let now = now.to_offset(UtcOffset::UTC);
        let today = now.date();
        let start_of = |date: time::Date| date.midnight().assume_utc();

        let (after, before) = match preset {
            DatePreset::Today => (start_of(today), start_of(today) + Duration::days(1)),
            DatePreset::PastSevenDays => (
                start_of(today) - Duration::days(7),
                start_of(today) + Duration::days(1),
            ),
            DatePreset::ThisMonth => {
                let first = today - Duration::days(i64::from(today.day()) - 1);
                let later = first + Duration::days(32);
                let next = later - Duration::days(i64::from(later.day()) - 1);
                (start_of(first), start_of(next))
            }
            DatePreset::ThisYear => {
                let first = today - Duration::days(i64::from(today.ordinal()) - 1);
                let later = first + Duration::days(366);
                let next = later - Duration::days(i64::from(later.ordinal()) - 1);
                (start_of(first), start_of(next))
            }
        };

        CreatedRange {
            after: Some(after),
            before: Some(before),
        }
    }
}

/// The canned date ranges the admin date filter offers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DatePreset {
    Today,
    PastSevenDays,
    ThisMonth,
    ThisYear,
}

impl FromStr for DatePreset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(DatePreset::Today),
            "past_7_days" => Ok(DatePreset::PastSevenDays),
            "this_month" => Ok(DatePreset::ThisMonth),
            "this_year" => Ok(DatePreset::ThisYear),
            _ => Err(ValidationError::InvalidFilter {
                field: "created",
                value: s.to_owned(),
            }),
        }
    }
}

/// The columns a list can be ordered by.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortField {
    Id,
    Location,
    Category,
    Status,
    Priority,
    UserEmail,
    ManualReview,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub const ALL: [SortField; 9] = [
        SortField::Id,
        SortField::Location,
        SortField::Category,
        SortField::Status,
        SortField::Priority,
        SortField::UserEmail,
        SortField::ManualReview,
        SortField::CreatedAt,
        SortField::UpdatedAt,
    ];

    /// The column name, which is also the name used in requests.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Location => "location",
            SortField::Category => "category",
            SortField::Status => "status",
            SortField::Priority => "priority",
            SortField::UserEmail => "user_email",
            SortField::ManualReview => "manual_review",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    fn sql_key(self) -> String {
        match self {
            SortField::ManualReview | SortField::CreatedAt | SortField::UpdatedAt => {
                self.column().to_owned()
            }
            _ => format!("{} COLLATE \"C\"", self.column()),
        }
    }

    fn compare(self, a: &Feedback, b: &Feedback) -> cmp::Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Location => a.location.cmp(&b.location),
            SortField::Category => nulls_last(&a.category, &b.category),
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            SortField::Priority => a.priority.as_str().cmp(b.priority.as_str()),
            SortField::UserEmail => nulls_last(&a.user_email, &b.user_email),
            SortField::ManualReview => a.manual_review.cmp(&b.manual_review),
            SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
            SortField::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
        }
    }
}

// PostgreSQL treats NULL as larger than any value
fn nulls_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> cmp::Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => cmp::Ordering::Less,
        (None, Some(_)) => cmp::Ordering::Greater,
        (None, None) => cmp::Ordering::Equal,
    }
}

/// A single-column ordering, written `column` or `-column`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ordering {
    pub field: SortField,
    pub descending: bool,
}

impl Ordering {
    pub fn ascending(field: SortField) -> Self {
        Ordering {
            field,
            descending: false,
        }
    }

    pub fn descending(field: SortField) -> Self {
        Ordering {
            field,
            descending: true,
        }
    }

    /// Compares two records in this order. Ties are broken by ID,
    /// descending, so the order is total.
    pub fn compare(&self, a: &Feedback, b: &Feedback) -> cmp::Ordering {
        let primary = self.field.compare(a, b);
        let primary = if self.descending {
            primary.reverse()
        } else {
            primary
        };

        primary.then_with(|| b.id.cmp(&a.id))
    }

    /// The SQL `ORDER BY` list for this ordering. Only ever built from
    /// the fixed column names above.
    /// Text is compared bytewise (`COLLATE "C"`), which is the order
    /// `compare` uses.
    pub fn to_sql(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };

        match self.field {
            SortField::Id => format!("{} {}", SortField::Id.sql_key(), direction),
            field => format!(
                "{} {}, {} DESC",
                field.sql_key(),
                direction,
                SortField::Id.sql_key()
            ),
        }
    }
}

impl Default for Ordering {
    fn default() -> Self {
        Ordering::descending(SortField::CreatedAt)
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field.column())
        } else {
            f.write_str(self.field.column())
        }
    }
}

impl FromStr for Ordering {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (descending, column) = match s.strip_prefix('-') {
            Some(column) => (true, column),
            None => (false, s),
        };

        SortField::ALL
            .iter()
            .find(|f| f.column() == column)
            .map(|&field| Ordering { field, descending })
            .ok_or_else(|| ValidationError::InvalidOrdering {
                value: s.to_owned(),
            })
    }
}

/// A window into an ordered list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Page {
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Everything that shapes a list of feedback.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Filters,

    /// Case-insensitive text searched for in the ID, description,
    /// location and email.
    pub search: Option<String>,

    pub ordering: Ordering,

    pub page: Page,
}

impl ListQuery {
    pub fn with_status(status: Status) -> Self {
        ListQuery {
            filters: Filters {
                status: Some(status),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_search(search: impl AsRef<str>) -> Self {
        ListQuery {
            search: normalized_search(search.as_ref()),
            ..Default::default()
        }
    }

    /// The search text, lowercased for comparison.
    pub fn search_key(&self) -> Option<String> {
        self.search.as_deref().and_then(normalized_search)
    }

    pub fn matches(&self, feedback: &Feedback) -> bool {
        self.filters.matches(feedback)
            && match self.search_key() {
                Some(needle) => search_fields(feedback).any(|haystack| {
                    haystack.to_lowercase().contains(&needle)
                }),
                None => true,
            }
    }
}

/// Fields covered by free-text search.
pub const SEARCH_FIELDS: [&str; 4] = ["id", "description", "location", "user_email"];

fn search_fields(feedback: &Feedback) -> impl Iterator<Item = &str> {
    vec![
        Some(feedback.id.as_str()),
        Some(feedback.description.as_str()),
        Some(feedback.location.as_str()),
        feedback.user_email.as_deref(),
    ]
    .into_iter()
    .flatten()
}

fn normalized_search(search: &str) -> Option<String> {
    let search = normalize_text(search);

    if search.is_empty() {
        None
    } else {
        Some(search.to_lowercase())
    }
}
