//! The todo entity and its write payloads.
//!
//! # Design
//! `Todo` is the stored record. `CreateTodo` and `UpdateTodo` are the loosely
//! typed payloads that arrive from the transport layer; `validate` turns them
//! into `NewTodo` / `TodoPatch`, which only hold trimmed, checked values.
//! Validation runs once, at write time. Stored values are never re-checked on
//! read, so a due date that was in the future at creation stays valid after it
//! passes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{TodoError, TodoResult};

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const TAG_MAX_CHARS: usize = 50;
pub const CATEGORY_MAX_CHARS: usize = 100;

/// Opaque identifier assigned by the store at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for TodoId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TodoId {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| TodoError::validation(format!("'{s}' is not a valid todo id")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Sort weight: higher is more important.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                TodoError::validation(format!(
                    "invalid priority '{s}' (expected one of low, medium, high)"
                ))
            })
    }
}

/// A stored todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a todo. Everything arrives as the client sent
/// it; `validate` does the trimming and rule checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A create payload that passed validation. `completed` always starts false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub category: Option<String>,
}

impl CreateTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn validate(self, now: DateTime<Utc>) -> TodoResult<NewTodo> {
        let title = validate_title(self.title.as_deref().unwrap_or_default())?;
        let priority = match self.priority.as_deref() {
            None | Some("") => Priority::default(),
            Some(raw) => raw.parse()?,
        };
        let due_date = match self.due_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(future_due_date(raw, now)?),
        };

        Ok(NewTodo {
            title,
            description: optional_text(self.description, "description", DESCRIPTION_MAX_CHARS)?,
            priority,
            due_date,
            tags: validate_tags(self.tags.unwrap_or_default())?,
            category: optional_text(self.category, "category", CATEGORY_MAX_CHARS)?,
        })
    }
}

/// Request payload for a partial update. Only the fields present in the JSON
/// change. `description`, `dueDate` and `category` accept an explicit `null`
/// to clear the stored value; a `null` title is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    #[serde(default, deserialize_with = "nullable")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<String>>,
}

/// Distinguishes a field set to `null` (`Some(None)`) from an absent one.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A validated partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub tags: Option<Vec<String>>,
    pub category: Option<Option<String>>,
}

impl UpdateTodo {
    pub fn validate(self, now: DateTime<Utc>) -> TodoResult<TodoPatch> {
        let due_date = match self.due_date {
            None => None,
            Some(raw) => match raw.as_deref().map(str::trim) {
                None | Some("") => Some(None),
                Some(raw) => Some(Some(future_due_date(raw, now)?)),
            },
        };

        Ok(TodoPatch {
            title: match self.title {
                None => None,
                Some(None) => return Err(TodoError::validation("title is required")),
                Some(Some(raw)) => Some(validate_title(&raw)?),
            },
            description: self
                .description
                .map(|d| optional_text(d, "description", DESCRIPTION_MAX_CHARS))
                .transpose()?,
            completed: self.completed,
            priority: self.priority.as_deref().map(str::parse::<Priority>).transpose()?,
            due_date,
            tags: self.tags.map(validate_tags).transpose()?,
            category: self
                .category
                .map(|c| optional_text(c, "category", CATEGORY_MAX_CHARS))
                .transpose()?,
        })
    }
}

impl TodoPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Write every supplied field onto `todo`. Timestamps are the store's job.
    pub fn apply_to(self, todo: &mut Todo) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(description) = self.description {
            todo.description = description;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        if let Some(priority) = self.priority {
            todo.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            todo.due_date = due_date;
        }
        if let Some(tags) = self.tags {
            todo.tags = tags;
        }
        if let Some(category) = self.category {
            todo.category = category;
        }
    }
}

fn validate_title(raw: &str) -> TodoResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TodoError::validation("title is required"));
    }
    check_length(title, "title", TITLE_MAX_CHARS)?;
    Ok(title.to_string())
}

/// Trim an optional free-text field; blank collapses to absent.
fn optional_text(raw: Option<String>, field: &str, max: usize) -> TodoResult<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let text = raw.trim();
    if text.is_empty() {
        return Ok(None);
    }
    check_length(text, field, max)?;
    Ok(Some(text.to_string()))
}

fn validate_tags(tags: Vec<String>) -> TodoResult<Vec<String>> {
    tags.into_iter()
        .map(|tag| {
            let tag = tag.trim();
            check_length(tag, "tag", TAG_MAX_CHARS)?;
            Ok(tag.to_string())
        })
        .collect()
}

fn check_length(text: &str, field: &str, max: usize) -> TodoResult<()> {
    if text.chars().count() > max {
        return Err(TodoError::validation(format!(
            "{field} must not exceed {max} characters"
        )));
    }
    Ok(())
}

fn future_due_date(raw: &str, now: DateTime<Utc>) -> TodoResult<DateTime<Utc>> {
    let due = parse_due_date(raw)?;
    if due <= now {
        return Err(TodoError::validation(
            "dueDate must be later than the current time",
        ));
    }
    Ok(due)
}

/// Accepts RFC 3339, a bare `YYYY-MM-DD` (UTC midnight), or a naive
/// `YYYY-MM-DDTHH:MM[:SS[.f]]` read as UTC.
pub fn parse_due_date(raw: &str) -> TodoResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(TodoError::validation(format!("'{raw}' is not a valid dueDate")))
}
