//! Read-time fields computed from a stored todo and the current instant.
//!
//! Nothing here is persisted. Given the same stored timestamps and the same
//! `now`, every function returns the same value.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::types::Todo;

/// Fixed display offset for the `*KST` fields.
pub const KST_OFFSET_HOURS: i64 = 9;

/// `timeRemaining` once the due date has passed.
pub const EXPIRED: &str = "마감됨";

const MS_PER_HOUR: i64 = 60 * 60 * 1000;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Human-readable span until `due`, or `None` when there is no due date.
pub fn time_remaining(due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<String> {
    let remaining = (due? - now).num_milliseconds();
    if remaining <= 0 {
        return Some(EXPIRED.to_string());
    }

    let days = remaining / MS_PER_DAY;
    let hours = (remaining % MS_PER_DAY) / MS_PER_HOUR;
    Some(if days > 0 {
        format!("{days}일 {hours}시간 남음")
    } else {
        format!("{hours}시간 남음")
    })
}

/// Incomplete and due within 24 hours. Overdue items count as urgent too;
/// the store-side urgent window in `TodoFilter::urgent` does not.
pub fn is_urgent(todo: &Todo, now: DateTime<Utc>) -> bool {
    match todo.due_date {
        Some(due) if !todo.completed => (due - now).num_milliseconds() <= MS_PER_DAY,
        _ => false,
    }
}

/// Presentation-only shift to KST. Never use the result for comparisons.
pub fn kst(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant + Duration::hours(KST_OFFSET_HOURS)
}

/// A todo as returned to callers: the stored fields plus derived ones.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoView {
    #[serde(flatten)]
    pub todo: Todo,
    pub time_remaining: Option<String>,
    pub is_urgent: bool,
    #[serde(rename = "createdAtKST", skip_serializing_if = "Option::is_none")]
    pub created_at_kst: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAtKST", skip_serializing_if = "Option::is_none")]
    pub updated_at_kst: Option<DateTime<Utc>>,
}

impl TodoView {
    pub fn new(todo: Todo, now: DateTime<Utc>) -> Self {
        Self {
            time_remaining: time_remaining(todo.due_date, now),
            is_urgent: is_urgent(&todo, now),
            created_at_kst: None,
            updated_at_kst: None,
            todo,
        }
    }

    /// Same as `new`, plus the KST-shifted timestamps. Only the list and
    /// create paths decorate this way.
    pub fn with_kst(todo: Todo, now: DateTime<Utc>) -> Self {
        let mut view = Self::new(todo, now);
        view.created_at_kst = Some(kst(view.todo.created_at));
        view.updated_at_kst = Some(kst(view.todo.updated_at));
        view
    }
}

/// A search result with its relevance score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredTodo {
    #[serde(flatten)]
    pub view: TodoView,
    pub score: f64,
}
