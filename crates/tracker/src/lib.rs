//! Client-side state for the mindframe tracker.
//!
//! Expenses, moods and tasks live on the backend and are mirrored into
//! reactive in-memory caches; budgets live only in local storage.
//!
//! All collections share one [`TrackerContext`]: the HTTP client, the
//! [`AuthSession`] they follow and the [`Notifier`] they report to.

pub mod api;
pub mod auth;
pub mod budget;
pub mod collection;
pub mod context;
pub mod error;
pub mod expenses;
pub mod moods;
pub mod storage;
pub mod tasks;
pub mod toast;

pub use api_types::{RecordIds, mood::MoodValue, task::TaskNew, task::TaskUpdate};
pub use auth::{AuthSession, Subscription};
pub use budget::{BudgetPeriod, BudgetStore};
pub use collection::{RemoteCollection, Resource};
pub use context::TrackerContext;
pub use error::{Result, TrackerError};
pub use expenses::{Expense, ExpenseChanges, ExpenseCollection, ExpenseDraft};
pub use moods::MoodCollection;
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use tasks::{Task, TaskCollection};
pub use toast::{Notifier, ToastLevel, ToastState};
