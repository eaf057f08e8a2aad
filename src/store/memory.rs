use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::filter::{Predicate, Scope};
use crate::model::expense::{Expense, ExpenseRow, NewExpense, Person};
use crate::model::tag::Tag;
use crate::model::user::{NewUser, User};
use crate::store::{Store, StoreError, StoreResult, distinct_tag_ids};

/// Keeps everything in ordered maps so listings come out in id order, like
/// the primary-key order of the MySQL tables.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    last_id: u64,
    users: BTreeMap<u64, User>,
    expenses: BTreeMap<u64, Expense>,
    tags: BTreeMap<u64, Tag>,
    /// (expense_id, tag_id)
    expenses_tags: BTreeSet<(u64, u64)>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn row(&self, expense: &Expense) -> Option<ExpenseRow> {
        let owner = self.users.get(&expense.user_id)?;
        let manager = owner
            .manager_user_id
            .and_then(|id| self.users.get(&id))
            .map(|m| Person {
                id: m.id,
                name: m.name.clone(),
            });

        let tags = self
            .expenses_tags
            .range((expense.id, 0)..=(expense.id, u64::MAX))
            .filter_map(|(_, tag_id)| self.tags.get(tag_id).cloned())
            .collect();

        Some(ExpenseRow {
            expense: expense.clone(),
            employee: Person {
                id: owner.id,
                name: owner.name.clone(),
            },
            manager,
            tags,
        })
    }

    fn replace_tags(&mut self, expense_id: u64, tag_ids: &[u64]) {
        self.expenses_tags.retain(|(e, _)| *e != expense_id);
        for tag_id in distinct_tag_ids(tag_ids) {
            if self.tags.contains_key(&tag_id) {
                self.expenses_tags.insert((expense_id, tag_id));
            }
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.write()?;

        if state
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict("email".into()));
        }

        let id = state.next_id();
        let user = User {
            id,
            email: user.email,
            encrypted_password: user.encrypted_password,
            name: user.name,
            role: user.role,
            manager_user_id: user.manager_user_id,
            active: user.active,
            revocation_id: user.revocation_id,
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: u64) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn rotate_revocation_id(
        &self,
        user_id: u64,
        current: &str,
        fresh: &str,
    ) -> StoreResult<bool> {
        let mut state = self.write()?;
        match state.users.get_mut(&user_id) {
            Some(user) if user.revocation_id == current => {
                user.revocation_id = fresh.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_user(&self, id: u64) -> StoreResult<bool> {
        let mut state = self.write()?;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }

        for user in state.users.values_mut() {
            if user.manager_user_id == Some(id) {
                user.manager_user_id = None;
            }
        }

        let owned: Vec<u64> = state
            .expenses
            .values()
            .filter(|e| e.user_id == id)
            .map(|e| e.id)
            .collect();
        for expense_id in owned {
            state.expenses.remove(&expense_id);
            state.expenses_tags.retain(|(e, _)| *e != expense_id);
        }

        Ok(true)
    }

    async fn query_expenses(
        &self,
        scope: &Scope,
        predicates: &[Predicate],
    ) -> StoreResult<Vec<ExpenseRow>> {
        let state = self.read()?;
        Ok(state
            .expenses
            .values()
            .filter_map(|e| state.row(e))
            .filter(|row| scope.permits(row) && predicates.iter().all(|p| p.matches(row)))
            .collect())
    }

    async fn find_expense(&self, id: u64) -> StoreResult<Option<ExpenseRow>> {
        let state = self.read()?;
        Ok(state.expenses.get(&id).and_then(|e| state.row(e)))
    }

    async fn insert_expense(&self, expense: NewExpense, tag_ids: &[u64]) -> StoreResult<u64> {
        let mut state = self.write()?;
        let id = state.next_id();
        state.expenses.insert(id, expense.with_id(id));
        state.replace_tags(id, tag_ids);
        Ok(id)
    }

    async fn update_expense(&self, expense: &Expense, tag_ids: Option<&[u64]>) -> StoreResult<()> {
        let mut state = self.write()?;
        state.expenses.insert(expense.id, expense.clone());
        if let Some(tag_ids) = tag_ids {
            state.replace_tags(expense.id, tag_ids);
        }
        Ok(())
    }

    async fn delete_expense(&self, id: u64) -> StoreResult<bool> {
        let mut state = self.write()?;
        let removed = state.expenses.remove(&id).is_some();
        state.expenses_tags.retain(|(e, _)| *e != id);
        Ok(removed)
    }

    async fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        Ok(self.read()?.tags.values().cloned().collect())
    }

    async fn find_tag(&self, id: u64) -> StoreResult<Option<Tag>> {
        Ok(self.read()?.tags.get(&id).cloned())
    }

    async fn find_tags(&self, ids: &[u64]) -> StoreResult<Vec<Tag>> {
        let state = self.read()?;
        Ok(distinct_tag_ids(ids)
            .into_iter()
            .filter_map(|id| state.tags.get(&id).cloned())
            .collect())
    }

    async fn insert_tag(&self, description: &str) -> StoreResult<Tag> {
        let mut state = self.write()?;
        let id = state.next_id();
        let tag = Tag {
            id,
            description: description.to_string(),
        };
        state.tags.insert(id, tag.clone());
        Ok(tag)
    }

    async fn update_tag(&self, tag: &Tag) -> StoreResult<bool> {
        let mut state = self.write()?;
        match state.tags.get_mut(&tag.id) {
            Some(existing) => {
                existing.description = tag.description.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_tag(&self, id: u64) -> StoreResult<bool> {
        let mut state = self.write()?;
        let removed = state.tags.remove(&id).is_some();
        state.expenses_tags.retain(|(_, t)| *t != id);
        Ok(removed)
    }
}
