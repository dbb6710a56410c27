//! Operations exposed to the transport layer.
//!
//! # Design
//! `TodoService` holds a store and a clock and nothing else; every call is
//! independent. Derived fields are attached on the way out using the same
//! `now` for the whole response. Only the paginated list and create decorate
//! with the KST timestamps; single fetch, update, toggle, delete and the fixed
//! views return the plain view.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::derived::TodoView;
use crate::error::{TodoError, TodoResult};
use crate::query::{ListParams, ListQuery, Paginated, SortKey, TodoFilter};
use crate::store::TodoStore;
use crate::types::{CreateTodo, Priority, TodoId, TodoPatch, UpdateTodo};

pub struct TodoService<S> {
    pub(crate) store: S,
    clock: Arc<dyn Clock>,
}

impl<S: TodoStore> TodoService<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Filtered, sorted, paginated list.
    pub async fn list(&self, params: &ListParams) -> TodoResult<Paginated<TodoView>> {
        let query = ListQuery::from_params(params);
        debug!(
            page = query.page,
            limit = query.limit,
            skip = query.skip,
            sort = ?query.sort,
            filter = ?query.filter,
            "listing todos"
        );

        let (todos, total) = self
            .store
            .find(&query.filter, query.sort, query.skip, Some(query.limit))
            .await?;
        let now = self.now();
        Ok(Paginated {
            items: todos.into_iter().map(|t| TodoView::with_kst(t, now)).collect(),
            pagination: query.pagination(total),
        })
    }

    pub async fn get(&self, id: TodoId) -> TodoResult<TodoView> {
        let todo = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(TodoError::NotFound(id))?;
        Ok(TodoView::new(todo, self.now()))
    }

    pub async fn create(&self, input: CreateTodo) -> TodoResult<TodoView> {
        let new = input.validate(self.now())?;
        let todo = self.store.insert(new).await?;
        info!(id = %todo.id, priority = %todo.priority, "todo created");
        Ok(TodoView::with_kst(todo, self.now()))
    }

    /// Partial update; only supplied fields change.
    pub async fn update(&self, id: TodoId, input: UpdateTodo) -> TodoResult<TodoView> {
        let patch = input.validate(self.now())?;
        let todo = self
            .store
            .update_by_id(id, patch)
            .await?
            .ok_or(TodoError::NotFound(id))?;
        info!(id = %id, "todo updated");
        Ok(TodoView::new(todo, self.now()))
    }

    pub async fn delete(&self, id: TodoId) -> TodoResult<TodoView> {
        let todo = self
            .store
            .delete_by_id(id)
            .await?
            .ok_or(TodoError::NotFound(id))?;
        info!(id = %id, "todo deleted");
        Ok(TodoView::new(todo, self.now()))
    }

    /// Flip `completed`.
    pub async fn toggle(&self, id: TodoId) -> TodoResult<TodoView> {
        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(TodoError::NotFound(id))?;
        let todo = self
            .store
            .update_by_id(id, TodoPatch::completed(!current.completed))
            .await?
            .ok_or(TodoError::NotFound(id))?;
        info!(id = %id, completed = todo.completed, "todo toggled");
        Ok(TodoView::new(todo, self.now()))
    }

    /// Completed todos, most recently updated first.
    pub async fn completed(&self) -> TodoResult<Vec<TodoView>> {
        self.view(&TodoFilter::completed(true), SortKey::UpdatedAtDesc)
            .await
    }

    /// Open todos, most important and soonest due first.
    pub async fn pending(&self) -> TodoResult<Vec<TodoView>> {
        self.view(&TodoFilter::completed(false), SortKey::PriorityThenDueDate)
            .await
    }

    /// Open todos due within the next 24 hours, soonest first. Already
    /// overdue todos are not included here even though `isUrgent` is true for
    /// them.
    pub async fn urgent(&self) -> TodoResult<Vec<TodoView>> {
        self.view(&TodoFilter::urgent(self.now()), SortKey::DueDateAsc)
            .await
    }

    pub async fn by_category(&self, category: &str) -> TodoResult<Vec<TodoView>> {
        let filter = TodoFilter {
            category: Some(category.to_string()),
            ..TodoFilter::default()
        };
        self.view(&filter, SortKey::CreatedAtDesc).await
    }

    /// Unlike the list filter, this entry point rejects unknown priorities.
    pub async fn by_priority(&self, priority: &str) -> TodoResult<Vec<TodoView>> {
        let priority: Priority = priority.parse()?;
        let filter = TodoFilter {
            priority: Some(priority.as_str().to_string()),
            ..TodoFilter::default()
        };
        self.view(&filter, SortKey::CreatedAtDesc).await
    }

    async fn view(&self, filter: &TodoFilter, sort: SortKey) -> TodoResult<Vec<TodoView>> {
        let (todos, _) = self.store.find(filter, sort, 0, None).await?;
        let now = self.now();
        Ok(todos.into_iter().map(|t| TodoView::new(t, now)).collect())
    }
}
