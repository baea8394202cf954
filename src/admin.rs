//! The declarative description of the feedback model handed to the
//! admin UI: which fields exist, which can be listed, filtered, searched
//! and edited inline, and how the edit form is laid out.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::feedback::{
    Priority, Status, CATEGORY_MAX_LENGTH, ID_MAX_LENGTH, LOCATION_MAX_LENGTH,
    USER_EMAIL_MAX_LENGTH,
};
use crate::query::{Ordering, SEARCH_FIELDS};

/// The kind of value a field holds.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    String { max_length: usize },
    Email { max_length: usize },
    Choice { choices: Vec<Choice> },
    Boolean,
    Reference { model: &'static str },
    Timestamp,
}

/// One allowed value of a choice field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Field {
    pub name: &'static str,

    #[serde(flatten)]
    pub kind: FieldKind,

    pub required: bool,

    /// The value used when none is supplied, as it is stored.
    pub default: Option<&'static str>,
}

impl Field {
    fn new(name: &'static str, kind: FieldKind, required: bool) -> Self {
        Field {
            name,
            kind,
            required,
            default: None,
        }
    }

    fn with_default(self, default: &'static str) -> Self {
        Field {
            default: Some(default),
            ..self
        }
    }
}

/// A titled group of fields on the edit form.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Fieldset {
    pub title: &'static str,
    pub fields: Vec<&'static str>,
    pub collapsed: bool,
}

/// Everything the admin UI needs to know about one model.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelAdmin {
    pub model: &'static str,
    pub fields: Vec<Field>,
    pub list_display: Vec<&'static str>,
    pub list_filter: Vec<&'static str>,
    pub search_fields: Vec<&'static str>,
    pub list_editable: Vec<&'static str>,
    pub readonly_fields: Vec<&'static str>,
    pub ordering: Vec<String>,
    pub fieldsets: Vec<Fieldset>,

    /// Related records fetched together with each listed record.
    pub list_select_related: Vec<&'static str>,

    pub list_per_page: u32,
}

/// Problems found when checking or registering a configuration.
#[derive(Debug, Error, PartialEq)]
pub enum AdminError {
    #[error("model {0} is already registered")]
    AlreadyRegistered(&'static str),

    #[error("{option} refers to unknown field {field}")]
    UnknownField {
        option: &'static str,
        field: &'static str,
    },

    #[error("list_editable field {0} is not in list_display")]
    EditableNotDisplayed(&'static str),

    #[error("list_editable field {0} is the first list_display column, which links to the record")]
    EditableLinkColumn(&'static str),

    #[error("list_editable field {0} is read-only")]
    EditableReadOnly(&'static str),

    #[error("field {0} appears in more than one fieldset")]
    RepeatedFieldsetField(&'static str),
}

impl ModelAdmin {
    /// The admin configuration of the feedback model.
    pub fn feedback(list_per_page: u32) -> Self {
        let status_choices = Status::ALL
            .iter()
            .map(|s| Choice {
                value: s.as_str(),
                label: s.label(),
            })
            .collect();
        let priority_choices = Priority::ALL
            .iter()
            .map(|p| Choice {
                value: p.as_str(),
                label: p.label(),
            })
            .collect();

        ModelAdmin {
            model: "feedback",
            fields: vec![
                Field::new(
                    "id",
                    FieldKind::String {
                        max_length: ID_MAX_LENGTH,
                    },
                    true,
                ),
                Field::new("description", FieldKind::Text, true),
                Field::new(
                    "location",
                    FieldKind::String {
                        max_length: LOCATION_MAX_LENGTH,
                    },
                    true,
                ),
                Field::new(
                    "category",
                    FieldKind::String {
                        max_length: CATEGORY_MAX_LENGTH,
                    },
                    false,
                ),
                Field::new(
                    "user_email",
                    FieldKind::Email {
                        max_length: USER_EMAIL_MAX_LENGTH,
                    },
                    false,
                ),
                Field::new(
                    "status",
                    FieldKind::Choice {
                        choices: status_choices,
                    },
                    true,
                )
                .with_default(Status::default().as_str()),
                Field::new(
                    "priority",
                    FieldKind::Choice {
                        choices: priority_choices,
                    },
                    true,
                )
                .with_default(Priority::default().as_str()),
                Field::new("manual_review", FieldKind::Boolean, false).with_default("false"),
                Field::new(
                    "duplicate_of",
                    FieldKind::Reference { model: "feedback" },
                    false,
                ),
                Field::new("created_at", FieldKind::Timestamp, false),
                Field::new("updated_at", FieldKind::Timestamp, false),
            ],
            list_display: vec![
                "id",
                "location",
                "category",
                "status",
                "priority",
                "user_email",
                "manual_review",
                "created_at",
            ],
            list_filter: vec!["status", "priority", "category", "manual_review", "created_at"],
            search_fields: SEARCH_FIELDS.to_vec(),
            list_editable: vec!["status", "priority", "manual_review"],
            readonly_fields: crate::feedback::READ_ONLY_FIELDS.to_vec(),
            ordering: vec![Ordering::default().to_string()],
            fieldsets: vec![
                Fieldset {
                    title: "Basic Information",
                    fields: vec!["id", "description", "location", "category", "user_email"],
                    collapsed: false,
                },
                Fieldset {
                    title: "Status & Priority",
                    fields: vec!["status", "priority", "manual_review", "duplicate_of"],
                    collapsed: false,
                },
                Fieldset {
                    title: "Timestamps",
                    fields: vec!["created_at", "updated_at"],
                    collapsed: true,
                },
            ],
            list_select_related: vec!["duplicate_of"],
            list_per_page,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_editable_inline(&self, name: &str) -> bool {
        self.list_editable.iter().any(|f| *f == name)
    }

    /// Checks that the options are consistent with each other and with
    /// the field list.
    pub fn check(&self) -> Result<(), AdminError> {
        let fieldset_fields: Vec<&'static str> = self
            .fieldsets
            .iter()
            .flat_map(|s| s.fields.iter().copied())
            .collect();

        let options: [(&'static str, &Vec<&'static str>); 7] = [
            ("list_display", &self.list_display),
            ("list_filter", &self.list_filter),
            ("search_fields", &self.search_fields),
            ("list_editable", &self.list_editable),
            ("readonly_fields", &self.readonly_fields),
            ("list_select_related", &self.list_select_related),
            ("fieldsets", &fieldset_fields),
        ];

        for &(option, fields) in options.iter() {
            if let Some(&field) = fields.iter().find(|f| self.field(f).is_none()) {
                return Err(AdminError::UnknownField { option, field });
            }
        }

        for &field in &self.list_editable {
            if !self.list_display.contains(&field) {
                return Err(AdminError::EditableNotDisplayed(field));
            }
            if self.list_display.first() == Some(&field) {
                return Err(AdminError::EditableLinkColumn(field));
            }
            if self.readonly_fields.contains(&field) {
                return Err(AdminError::EditableReadOnly(field));
            }
        }

        let mut seen = Vec::new();
        for field in fieldset_fields {
            if seen.contains(&field) {
                return Err(AdminError::RepeatedFieldsetField(field));
            }
            seen.push(field);
        }

        Ok(())
    }
}

/// The registry of model configurations. Built once at startup and then
/// shared read-only.
#[derive(Debug, Default, Serialize)]
pub struct AdminSite {
    models: BTreeMap<&'static str, ModelAdmin>,
}

impl AdminSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the site with every model this crate provides.
    pub fn initialize(list_per_page: u32) -> Result<Self, AdminError> {
        let mut site = AdminSite::new();
        site.register(ModelAdmin::feedback(list_per_page))?;

        Ok(site)
    }

    pub fn register(&mut self, admin: ModelAdmin) -> Result<(), AdminError> {
        if self.models.contains_key(admin.model) {
            return Err(AdminError::AlreadyRegistered(admin.model));
        }

        admin.check()?;
        self.models.insert(admin.model, admin);

        Ok(())
    }

    pub fn get(&self, model: &str) -> Option<&ModelAdmin> {
        self.models.get(model)
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelAdmin> {
        self.models.values()
    }
}
