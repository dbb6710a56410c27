use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use tokio::sync::RwLock;
use tracing::trace;

use super::{GroupField, TodoStore};
use crate::clock::Clock;
use crate::error::StoreResult;
use crate::query::{SortKey, TodoFilter};
use crate::search::TextQuery;
use crate::types::{NewTodo, Todo, TodoId, TodoPatch};

/// In-process store. Todos are kept in insertion order, and every sort is
/// stable, so ties come back oldest-inserted first.
///
/// Timestamps have millisecond precision. `updatedAt` strictly increases on
/// every mutation even if the clock has not moved.
pub struct MemoryStore {
    todos: RwLock<Vec<Todo>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            todos: RwLock::new(Vec::new()),
            clock,
        }
    }

    pub async fn len(&self) -> usize {
        self.todos.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.todos.read().await.is_empty()
    }

    fn stamp(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }

    fn touch(&self, todo: &mut Todo) {
        todo.updated_at = self
            .stamp()
            .max(todo.updated_at + Duration::milliseconds(1));
    }
}

impl TodoStore for MemoryStore {
    async fn insert(&self, todo: NewTodo) -> StoreResult<Todo> {
        let now = self.stamp();
        let todo = Todo {
            id: TodoId::new(),
            title: todo.title,
            description: todo.description,
            completed: false,
            priority: todo.priority,
            due_date: todo.due_date,
            tags: todo.tags,
            category: todo.category,
            created_at: now,
            updated_at: now,
        };
        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn find_by_id(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let todos = self.todos.read().await;
        Ok(todos.iter().find(|t| t.id == id).cloned())
    }

    async fn find(
        &self,
        filter: &TodoFilter,
        sort: SortKey,
        skip: usize,
        limit: Option<usize>,
    ) -> StoreResult<(Vec<Todo>, usize)> {
        let todos = self.todos.read().await;
        let mut matched: Vec<&Todo> = todos.iter().filter(|t| filter.matches(t)).collect();
        matched.sort_by(|a, b| sort.compare(a, b));

        let total = matched.len();
        let page = matched
            .into_iter()
            .skip(skip)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        trace!(total, skip, ?limit, ?sort, "memory store find");
        Ok((page, total))
    }

    async fn update_by_id(&self, id: TodoId, patch: TodoPatch) -> StoreResult<Option<Todo>> {
        let mut todos = self.todos.write().await;
        let Some(todo) = todos.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        patch.apply_to(todo);
        self.touch(todo);
        Ok(Some(todo.clone()))
    }

    async fn delete_by_id(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let mut todos = self.todos.write().await;
        Ok(todos
            .iter()
            .position(|t| t.id == id)
            .map(|index| todos.remove(index)))
    }

    async fn count(&self, filter: &TodoFilter) -> StoreResult<usize> {
        let todos = self.todos.read().await;
        Ok(todos.iter().filter(|t| filter.matches(t)).count())
    }

    async fn group_count(&self, field: GroupField) -> StoreResult<Vec<(Option<String>, usize)>> {
        let todos = self.todos.read().await;
        let mut groups: Vec<(Option<String>, usize)> = Vec::new();
        for todo in todos.iter() {
            let key = field.key_of(todo);
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, count)) => *count += 1,
                None => groups.push((key, 1)),
            }
        }
        Ok(groups)
    }

    async fn text_search(&self, query: &TextQuery) -> StoreResult<Vec<(Todo, f64)>> {
        let todos = self.todos.read().await;
        Ok(todos
            .iter()
            .filter_map(|t| query.score(t).map(|score| (t.clone(), score)))
            .collect())
    }
}
