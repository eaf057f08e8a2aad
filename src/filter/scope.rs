//! Which expenses an actor may see, and which users an actor may delete.

use sqlx::{MySql, QueryBuilder};

use crate::error::ApiError;
use crate::model::expense::ExpenseRow;
use crate::model::user::User;

/// Base visibility predicate for an actor. Filters only ever narrow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// A manager's own expenses plus those of the users they manage.
    Managed { manager_id: u64 },
    /// Only the employee's own expenses.
    Own { user_id: u64 },
}

impl Scope {
    pub fn for_actor(actor: &User) -> Self {
        if actor.is_manager() {
            Scope::Managed {
                manager_id: actor.id,
            }
        } else {
            Scope::Own { user_id: actor.id }
        }
    }

    pub fn permits(&self, row: &ExpenseRow) -> bool {
        match *self {
            Scope::Managed { manager_id } => {
                row.expense.user_id == manager_id
                    || row.manager.as_ref().is_some_and(|m| m.id == manager_id)
            }
            Scope::Own { user_id } => row.expense.user_id == user_id,
        }
    }

    /// Renders the scope against the `e` (expense) / `u` (owner) aliases.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, MySql>) {
        match *self {
            Scope::Managed { manager_id } => {
                qb.push("(u.manager_user_id = ")
                    .push_bind(manager_id)
                    .push(" OR e.user_id = ")
                    .push_bind(manager_id)
                    .push(")");
            }
            Scope::Own { user_id } => {
                qb.push("e.user_id = ").push_bind(user_id);
            }
        }
    }
}

/// A user may delete themself; a manager may delete the employees they manage.
pub fn authorize_user_deletion(actor: &User, target: Option<&User>) -> Result<(), ApiError> {
    let target = target.ok_or_else(|| ApiError::not_found("User"))?;

    if actor.id == target.id || actor.manages(target) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You are not allowed to delete this user".into(),
        ))
    }
}
