//! The entity store boundary.
//!
//! # Design
//! `TodoService` only talks to persistence through `TodoStore`. The trait
//! says what a query must express and what it must return; how a concrete
//! store executes it is its own business. `NotFound` is signalled with `None`
//! so the service can attach the id it was asked about.
//!
//! Methods return `Send` futures so a service over any store can be driven
//! from a multi-threaded runtime.

mod memory;

use std::future::Future;

use crate::error::StoreResult;
use crate::query::{SortKey, TodoFilter};
use crate::search::TextQuery;
use crate::types::{NewTodo, Todo, TodoId, TodoPatch};

pub use memory::MemoryStore;

/// Fields `group_count` can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Priority,
    Category,
}

impl GroupField {
    pub fn key_of(&self, todo: &Todo) -> Option<String> {
        match self {
            GroupField::Priority => Some(todo.priority.as_str().to_string()),
            GroupField::Category => todo.category.clone(),
        }
    }
}

pub trait TodoStore: Send + Sync {
    /// Persist a validated todo. The store assigns `id`, `createdAt` and
    /// `updatedAt`.
    fn insert(&self, todo: NewTodo) -> impl Future<Output = StoreResult<Todo>> + Send;

    fn find_by_id(&self, id: TodoId) -> impl Future<Output = StoreResult<Option<Todo>>> + Send;

    /// Matching todos in `sort` order, after skipping `skip` and taking at most
    /// `limit`, together with the number matched before paging.
    fn find(
        &self,
        filter: &TodoFilter,
        sort: SortKey,
        skip: usize,
        limit: Option<usize>,
    ) -> impl Future<Output = StoreResult<(Vec<Todo>, usize)>> + Send;

    /// Apply `patch` and refresh `updatedAt`. Returns the updated todo.
    fn update_by_id(
        &self,
        id: TodoId,
        patch: TodoPatch,
    ) -> impl Future<Output = StoreResult<Option<Todo>>> + Send;

    /// Remove the todo permanently, returning its last state.
    fn delete_by_id(&self, id: TodoId) -> impl Future<Output = StoreResult<Option<Todo>>> + Send;

    fn count(&self, filter: &TodoFilter) -> impl Future<Output = StoreResult<usize>> + Send;

    /// `(value, count)` per distinct value of `field`; `None` collects todos
    /// without a value.
    fn group_count(
        &self,
        field: GroupField,
    ) -> impl Future<Output = StoreResult<Vec<(Option<String>, usize)>>> + Send;

    /// Every matching todo with its relevance score, in no particular order.
    fn text_search(
        &self,
        query: &TextQuery,
    ) -> impl Future<Output = StoreResult<Vec<(Todo, f64)>>> + Send;
}
