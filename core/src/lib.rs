//! Query, derived-field and aggregation core for the todo service.
//!
//! # Overview
//! `TodoService` turns loosely typed request parameters into store queries,
//! decorates results with read-time fields and shapes paginated responses.
//! Persistence sits behind the `TodoStore` trait; `MemoryStore` is the
//! in-process implementation.
//!
//! # Design
//! - Validation happens once, when a payload becomes a `NewTodo` or
//!   `TodoPatch`. Reads never re-validate.
//! - Derived fields (`timeRemaining`, `isUrgent`, the KST timestamps) are
//!   pure functions of stored values and an injected `Clock`.
//! - Every operation returns either data or one `TodoError`.

pub mod clock;
pub mod derived;
pub mod error;
pub mod query;
pub mod search;
pub mod service;
pub mod stats;
pub mod store;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use derived::{ScoredTodo, TodoView};
pub use error::{StoreError, TodoError, TodoResult};
pub use query::{ListParams, ListQuery, Paginated, Pagination, SortKey, TodoFilter};
pub use search::TextQuery;
pub use service::TodoService;
pub use stats::{GroupCount, StatsOverview};
pub use store::{GroupField, MemoryStore, TodoStore};
pub use types::{CreateTodo, Priority, Todo, TodoId, UpdateTodo};
