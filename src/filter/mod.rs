//! Expense listing: the actor's scope folded with every filter the request
//! supplied.

pub mod predicate;
pub mod scope;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::model::expense::{ExpenseRow, ExpenseStatus};
use crate::model::user::User;
use crate::store::{Store, StoreError};

pub use predicate::Predicate;
pub use scope::Scope;

const PENDING: &[ExpenseStatus] = &[ExpenseStatus::Pending];
const HISTORY: &[ExpenseStatus] = &[ExpenseStatus::Approved, ExpenseStatus::Declined];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatusGroup {
    Pending,
    /// Approved or declined.
    History,
}

impl StatusGroup {
    /// `P` or `H`; anything else selects no group.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "P" => Some(StatusGroup::Pending),
            "H" => Some(StatusGroup::History),
            _ => None,
        }
    }

    pub fn statuses(&self) -> &'static [ExpenseStatus] {
        match self {
            StatusGroup::Pending => PENDING,
            StatusGroup::History => HISTORY,
        }
    }
}

/// Optional filters for the expense listing. Absent fields impose nothing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExpenseFilter {
    pub status_group: Option<StatusGroup>,
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub final_date: Option<NaiveDate>,
    pub employee_id: Option<u64>,
    pub manager_user_id: Option<u64>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub text_filter: Option<String>,
    pub tags: Vec<u64>,
}

impl ExpenseFilter {
    /// The supplied filters as predicates, always in the same order.
    ///
    /// An open-ended start date runs up to `today`; a lone amount bound is
    /// ignored because both ends are required.
    pub fn predicates(&self, today: NaiveDate) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(group) = self.status_group {
            predicates.push(Predicate::StatusIn(group.statuses()));
        }

        if let Some(day) = self.date {
            predicates.push(Predicate::DateOn(day));
        }

        match (self.start_date, self.final_date) {
            (Some(start), Some(end)) => predicates.push(Predicate::DateBetween(start, end)),
            (Some(start), None) => predicates.push(Predicate::DateBetween(start, today)),
            (None, Some(end)) => predicates.push(Predicate::DateUntil(end)),
            (None, None) => {}
        }

        if let Some(employee_id) = self.employee_id {
            predicates.push(Predicate::OwnedBy(employee_id));
        }

        if let Some(manager_id) = self.manager_user_id {
            predicates.push(Predicate::ManagedBy(manager_id));
        }

        if let (Some(min), Some(max)) = (self.min_amount, self.max_amount) {
            predicates.push(Predicate::AmountBetween(min, max));
        }

        if let Some(text) = &self.text_filter {
            predicates.push(Predicate::DescriptionContains(text.clone()));
        }

        if !self.tags.is_empty() {
            predicates.push(Predicate::TaggedWithAny(self.tags.clone()));
        }

        predicates
    }
}

/// Expenses visible to `actor` that satisfy every filter, in id order.
pub async fn filter_expenses(
    store: &dyn Store,
    actor: &User,
    filter: &ExpenseFilter,
    today: NaiveDate,
) -> Result<Vec<ExpenseRow>, StoreError> {
    let scope = Scope::for_actor(actor);
    let predicates = filter.predicates(today);

    tracing::debug!(
        actor = actor.id,
        ?scope,
        predicates = predicates.len(),
        "Filtering expenses"
    );

    store.query_expenses(&scope, &predicates).await
}
