use serde::Deserialize;
use time::OffsetDateTime;

use crate::errors::ValidationError;
use crate::feedback::{Priority, Status};
use crate::normalization::normalize_optional;
use crate::query::{CreatedRange, DatePreset, Filters, ListQuery, Page};

/// The query string of the list and count routes.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    status: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    manual_review: Option<String>,
    created_after: Option<i64>,
    created_before: Option<i64>,
    created: Option<String>,
    q: Option<String>,
    o: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl ListParams {
    /// Interprets the parameters as of `now`, which anchors the date
    /// presets. Without an explicit limit, lists return `per_page`
    /// records.
    pub fn into_query(self, now: OffsetDateTime, per_page: u32) -> Result<ListQuery, ValidationError> {
        let mut created = CreatedRange {
            after: self.created_after.map(|t| timestamp("created_after", t)).transpose()?,
            before: self.created_before.map(|t| timestamp("created_before", t)).transpose()?,
        };

        if let Some(preset) = self.created {
            let preset: DatePreset = preset.parse()?;
            created = created.intersect(CreatedRange::preset(preset, now));
        }

        let filters = Filters {
            status: self
                .status
                .map(|s| Status::parse("status", &s))
                .transpose()?,
            priority: self
                .priority
                .map(|p| Priority::parse("priority", &p))
                .transpose()?,
            category: normalize_optional(self.category),
            manual_review: self.manual_review.map(|m| flag(&m)).transpose()?,
            created,
        };

        let ordering = match self.o {
            Some(o) => o.parse()?,
            None => Default::default(),
        };

        Ok(ListQuery {
            filters,
            search: self.q,
            ordering,
            page: Page {
                limit: Some(self.limit.unwrap_or(per_page)),
                offset: self.offset.unwrap_or_default(),
            },
        })
    }
}

fn timestamp(field: &'static str, seconds: i64) -> Result<OffsetDateTime, ValidationError> {
    // keep within the range every backend can store
    const MAX_SECONDS: i64 = 253_402_300_799;

    if (-MAX_SECONDS..=MAX_SECONDS).contains(&seconds) {
        Ok(OffsetDateTime::from_unix_timestamp(seconds))
    } else {
        Err(ValidationError::InvalidFilter {
            field,
            value: seconds.to_string(),
        })
    }
}

fn flag(value: &str) -> Result<bool, ValidationError> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ValidationError::InvalidFilter {
            field: "manual_review",
            value: value.to_owned(),
        }),
    }
}
