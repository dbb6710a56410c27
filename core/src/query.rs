//! Turns loosely typed list parameters into a normalized query descriptor.
//!
//! # Design
//! The transport layer hands over raw strings. Nothing here fails: unparsable
//! paging values fall back to defaults, an unrecognized `sortBy` falls back to
//! newest-first, and the `priority` filter is matched verbatim so that an
//! unknown value simply matches nothing.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Todo;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;

/// Width of the store-side urgent window.
pub const URGENT_WINDOW_HOURS: i64 = 24;

/// Raw list parameters as they arrive in a query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub completed: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

/// Conjunction of optional constraints. `None` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub completed: Option<bool>,
    pub priority: Option<String>,
    pub category: Option<String>,
    /// Closed interval on `dueDate`; todos without one never match.
    pub due_within: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl TodoFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Incomplete todos due in `[now, now + 24h]`.
    pub fn urgent(now: DateTime<Utc>) -> Self {
        Self {
            completed: Some(false),
            due_within: Some((now, now + Duration::hours(URGENT_WINDOW_HOURS))),
            ..Self::default()
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        if self.completed.is_some_and(|c| c != todo.completed) {
            return false;
        }
        if let Some(priority) = &self.priority {
            if priority != todo.priority.as_str() {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if todo.category.as_ref() != Some(category) {
                return false;
            }
        }
        if let Some((from, to)) = self.due_within {
            match todo.due_date {
                Some(due) if from <= due && due <= to => {}
                _ => return false,
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreatedAtDesc,
    UpdatedAtDesc,
    /// High before medium before low, then earliest due date.
    PriorityThenDueDate,
    DueDateAsc,
    TitleAsc,
}

impl SortKey {
    pub fn from_param(sort_by: Option<&str>) -> Self {
        match sort_by {
            Some("priority") => SortKey::PriorityThenDueDate,
            Some("dueDate") => SortKey::DueDateAsc,
            Some("title") => SortKey::TitleAsc,
            _ => SortKey::CreatedAtDesc,
        }
    }

    pub fn compare(&self, a: &Todo, b: &Todo) -> Ordering {
        match self {
            SortKey::CreatedAtDesc => b.created_at.cmp(&a.created_at),
            SortKey::UpdatedAtDesc => b.updated_at.cmp(&a.updated_at),
            SortKey::PriorityThenDueDate => b
                .priority
                .rank()
                .cmp(&a.priority.rank())
                .then_with(|| due_ascending(a.due_date, b.due_date)),
            SortKey::DueDateAsc => due_ascending(a.due_date, b.due_date),
            SortKey::TitleAsc => a.title.cmp(&b.title),
        }
    }
}

/// Ascending, with missing due dates last.
fn due_ascending(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Normalized descriptor for the paginated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: TodoFilter,
    pub sort: SortKey,
    pub page: usize,
    pub skip: usize,
    pub limit: usize,
}

impl ListQuery {
    pub fn from_params(params: &ListParams) -> Self {
        let page = parse_positive(params.page.as_deref(), DEFAULT_PAGE);
        let limit = parse_positive(params.limit.as_deref(), DEFAULT_LIMIT);

        Self {
            filter: TodoFilter {
                completed: params.completed.as_deref().map(|c| c == "true"),
                priority: non_empty(params.priority.as_deref()),
                category: non_empty(params.category.as_deref()),
                due_within: None,
            },
            sort: SortKey::from_param(params.sort_by.as_deref()),
            page,
            skip: (page - 1).saturating_mul(limit),
            limit,
        }
    }

    pub fn pagination(&self, total_items: usize) -> Pagination {
        Pagination {
            current_page: self.page,
            total_pages: total_items.div_ceil(self.limit),
            total_items,
            items_per_page: self.limit,
        }
    }
}

/// Leading-digit integer parse. Digits too large for `usize` saturate;
/// anything else that does not yield a positive number falls back to
/// `default`.
fn parse_positive(raw: Option<&str>, default: usize) -> usize {
    let Some(raw) = raw else {
        return default;
    };
    let raw = raw.trim_start();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    let digits: String = raw.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return default;
    }
    match digits.parse::<usize>() {
        Ok(0) => default,
        Ok(n) => n,
        Err(_) => usize::MAX,
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.is_empty()).map(str::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
}

/// One page of results plus the envelope describing it.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}
