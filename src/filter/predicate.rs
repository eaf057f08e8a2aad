use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{MySql, QueryBuilder};

use crate::model::expense::{ExpenseRow, ExpenseStatus};

/// One narrowing condition over the scoped expense set.
///
/// Each variant can be evaluated against a loaded row or rendered into a SQL
/// `WHERE` fragment; both forms must select the same rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    StatusIn(&'static [ExpenseStatus]),
    DateOn(NaiveDate),
    /// Inclusive on both ends.
    DateBetween(NaiveDate, NaiveDate),
    DateUntil(NaiveDate),
    OwnedBy(u64),
    /// Owner's manager is the given user.
    ManagedBy(u64),
    /// Inclusive on both ends.
    AmountBetween(Decimal, Decimal),
    /// Case-insensitive substring match on the description.
    DescriptionContains(String),
    TaggedWithAny(Vec<u64>),
}

impl Predicate {
    pub fn matches(&self, row: &ExpenseRow) -> bool {
        let expense = &row.expense;
        match self {
            Predicate::StatusIn(statuses) => statuses.contains(&expense.status),
            Predicate::DateOn(day) => expense.date == *day,
            Predicate::DateBetween(start, end) => *start <= expense.date && expense.date <= *end,
            Predicate::DateUntil(end) => expense.date <= *end,
            Predicate::OwnedBy(user_id) => expense.user_id == *user_id,
            Predicate::ManagedBy(manager_id) => {
                row.manager.as_ref().is_some_and(|m| m.id == *manager_id)
            }
            Predicate::AmountBetween(min, max) => *min <= expense.amount && expense.amount <= *max,
            Predicate::DescriptionContains(text) => expense
                .description
                .to_lowercase()
                .contains(&text.to_lowercase()),
            Predicate::TaggedWithAny(tag_ids) => row.tags.iter().any(|t| tag_ids.contains(&t.id)),
        }
    }

    /// Renders against the `e` (expense) / `u` (owner) aliases.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, MySql>) {
        match self {
            Predicate::StatusIn(statuses) => {
                qb.push("e.status IN (");
                let mut list = qb.separated(", ");
                for status in statuses.iter() {
                    list.push_bind(status.to_string());
                }
                qb.push(")");
            }
            Predicate::DateOn(day) => {
                qb.push("e.date = ").push_bind(*day);
            }
            Predicate::DateBetween(start, end) => {
                qb.push("e.date BETWEEN ")
                    .push_bind(*start)
                    .push(" AND ")
                    .push_bind(*end);
            }
            Predicate::DateUntil(end) => {
                qb.push("e.date <= ").push_bind(*end);
            }
            Predicate::OwnedBy(user_id) => {
                qb.push("e.user_id = ").push_bind(*user_id);
            }
            Predicate::ManagedBy(manager_id) => {
                qb.push("u.manager_user_id = ").push_bind(*manager_id);
            }
            Predicate::AmountBetween(min, max) => {
                qb.push("e.amount BETWEEN ")
                    .push_bind(*min)
                    .push(" AND ")
                    .push_bind(*max);
            }
            Predicate::DescriptionContains(text) => {
                qb.push("LOWER(e.description) LIKE ")
                    .push_bind(format!("%{}%", escape_like(&text.to_lowercase())));
            }
            Predicate::TaggedWithAny(tag_ids) => {
                qb.push(
                    "EXISTS (SELECT 1 FROM expenses_tags et WHERE et.expense_id = e.id AND et.tag_id IN (",
                );
                let mut list = qb.separated(", ");
                for tag_id in tag_ids {
                    list.push_bind(*tag_id);
                }
                qb.push("))");
            }
        }
    }
}

/// Escapes LIKE wildcards so user text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
