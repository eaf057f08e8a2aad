//! Persistence boundary. Handlers only see [`Store`]; the server picks MySQL
//! or the in-memory implementation from `DATABASE_URL`.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use derive_more::{Display, From};

use crate::filter::{Predicate, Scope};
use crate::model::expense::{Expense, ExpenseRow, NewExpense};
use crate::model::tag::Tag;
use crate::model::user::{NewUser, User};

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Display, From)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
    #[from(ignore)]
    #[display(fmt = "corrupt row: {}", _0)]
    Corrupt(String),
    /// A unique column already holds the value.
    #[from(ignore)]
    #[display(fmt = "duplicate {}", _0)]
    Conflict(String),
    #[from(ignore)]
    #[display(fmt = "store lock poisoned")]
    Poisoned,
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the email is taken.
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: u64) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Swaps the revocation marker only if it still equals `current`.
    /// Returns whether the swap happened.
    async fn rotate_revocation_id(&self, user_id: u64, current: &str, fresh: &str)
    -> StoreResult<bool>;
    /// Removes the user and their expenses; their employees lose the manager link.
    async fn delete_user(&self, id: u64) -> StoreResult<bool>;

    async fn query_expenses(
        &self,
        scope: &Scope,
        predicates: &[Predicate],
    ) -> StoreResult<Vec<ExpenseRow>>;
    async fn find_expense(&self, id: u64) -> StoreResult<Option<ExpenseRow>>;
    async fn insert_expense(&self, expense: NewExpense, tag_ids: &[u64]) -> StoreResult<u64>;
    /// `tag_ids: None` leaves the tag set untouched.
    async fn update_expense(&self, expense: &Expense, tag_ids: Option<&[u64]>) -> StoreResult<()>;
    async fn delete_expense(&self, id: u64) -> StoreResult<bool>;

    async fn list_tags(&self) -> StoreResult<Vec<Tag>>;
    async fn find_tag(&self, id: u64) -> StoreResult<Option<Tag>>;
    /// The subset of `ids` that exist.
    async fn find_tags(&self, ids: &[u64]) -> StoreResult<Vec<Tag>>;
    async fn insert_tag(&self, description: &str) -> StoreResult<Tag>;
    async fn update_tag(&self, tag: &Tag) -> StoreResult<bool>;
    async fn delete_tag(&self, id: u64) -> StoreResult<bool>;
}

/// Sorted, duplicate-free tag ids, matching the join table's uniqueness.
pub fn distinct_tag_ids(ids: &[u64]) -> Vec<u64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}
