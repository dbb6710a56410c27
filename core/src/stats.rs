//! Summary statistics over the whole todo set.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TodoResult;
use crate::query::TodoFilter;
use crate::service::TodoService;
use crate::store::{GroupField, TodoStore};

/// `categoryStats` keeps at most this many groups.
pub const TOP_CATEGORIES: usize = 10;

/// One grouped count. `key` is `null` for todos without the grouped field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    #[serde(rename = "_id")]
    pub key: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOverview {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub urgent: usize,
    pub completion_rate: u32,
    pub priority_stats: Vec<GroupCount>,
    pub category_stats: Vec<GroupCount>,
}

/// Whole-percent completion, 0 for an empty set.
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u32
}

/// Largest groups first, cut to `TOP_CATEGORIES`. Ties keep store order.
pub fn top_categories(mut groups: Vec<GroupCount>) -> Vec<GroupCount> {
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups.truncate(TOP_CATEGORIES);
    groups
}

fn to_group_counts(groups: Vec<(Option<String>, usize)>) -> Vec<GroupCount> {
    groups
        .into_iter()
        .map(|(key, count)| GroupCount { key, count })
        .collect()
}

impl<S: TodoStore> TodoService<S> {
    pub async fn stats(&self) -> TodoResult<StatsOverview> {
        let total = self.store.count(&TodoFilter::all()).await?;
        let completed = self.store.count(&TodoFilter::completed(true)).await?;
        let pending = self.store.count(&TodoFilter::completed(false)).await?;
        let urgent = self.store.count(&TodoFilter::urgent(self.now())).await?;
        let priority_stats = to_group_counts(self.store.group_count(GroupField::Priority).await?);
        let category_stats =
            top_categories(to_group_counts(self.store.group_count(GroupField::Category).await?));

        debug!(total, completed, pending, urgent, "computed stats overview");
        Ok(StatsOverview {
            total,
            completed,
            pending,
            urgent,
            completion_rate: completion_rate(completed, total),
            priority_stats,
            category_stats,
        })
    }
}
