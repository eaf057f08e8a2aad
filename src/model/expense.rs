use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::tag::Tag;
use crate::utils::validation::{
    TEXT_MAX_LEN, ValidationErrors, check_length, require, require_present,
};

/// Amounts are kept at currency scale.
pub const AMOUNT_SCALE: u32 = 2;
/// Digits allowed before the decimal point.
pub const AMOUNT_INTEGER_DIGITS: u32 = 10;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum ExpenseStatus {
    #[serde(rename = "P")]
    #[strum(serialize = "P")]
    Pending,
    #[serde(rename = "A")]
    #[strum(serialize = "A")]
    Approved,
    #[serde(rename = "D")]
    #[strum(serialize = "D")]
    Declined,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: u64,
    pub description: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub location: String,
    pub status: ExpenseStatus,
    pub user_id: u64,
    pub receipt_nf: Option<String>,
    pub receipt_card: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub location: String,
    pub status: ExpenseStatus,
    pub user_id: u64,
    pub receipt_nf: Option<String>,
    pub receipt_card: Option<String>,
}

impl NewExpense {
    pub fn with_id(self, id: u64) -> Expense {
        Expense {
            id,
            description: self.description,
            date: self.date,
            amount: self.amount,
            location: self.location,
            status: self.status,
            user_id: self.user_id,
            receipt_nf: self.receipt_nf,
            receipt_card: self.receipt_card,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Person {
    #[schema(example = 2)]
    pub id: u64,
    #[schema(example = "Employee Name")]
    pub name: String,
}

/// An expense joined with everything the listing needs: owner, the owner's
/// manager and the tag set.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRow {
    pub expense: Expense,
    pub employee: Person,
    pub manager: Option<Person>,
    pub tags: Vec<Tag>,
}

/// Joined row shape returned by the listing query.
#[derive(Debug, sqlx::FromRow)]
pub struct ExpenseSql {
    pub id: u64,
    pub description: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub location: String,
    pub status: String,
    pub user_id: u64,
    pub receipt_nf: Option<String>,
    pub receipt_card: Option<String>,
    pub owner_name: String,
    pub manager_user_id: Option<u64>,
    pub manager_name: Option<String>,
}

impl ExpenseSql {
    pub fn into_row(self, tags: Vec<Tag>) -> Result<ExpenseRow, String> {
        let status = ExpenseStatus::from_str(&self.status)
            .map_err(|_| format!("expense {} has unknown status {:?}", self.id, self.status))?;

        let manager = match (self.manager_user_id, self.manager_name) {
            (Some(id), Some(name)) => Some(Person { id, name }),
            _ => None,
        };

        Ok(ExpenseRow {
            employee: Person {
                id: self.user_id,
                name: self.owner_name,
            },
            manager,
            tags,
            expense: Expense {
                id: self.id,
                description: self.description,
                date: self.date,
                amount: self.amount,
                location: self.location,
                status,
                user_id: self.user_id,
                receipt_nf: self.receipt_nf,
                receipt_card: self.receipt_card,
            },
        })
    }
}

/// Expense attributes as sent by clients. Every field is optional so the same
/// shape serves creation and partial update; validation decides what is missing.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct ExpenseDraft {
    #[schema(example = "Taxi to airport")]
    pub description: Option<String>,
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    #[schema(example = "42.50", value_type = Option<String>)]
    pub amount: Option<Decimal>,
    #[schema(example = "Recife")]
    pub location: Option<String>,
    #[schema(example = "P")]
    pub status: Option<String>,
    #[schema(example = "invoice-0001.pdf")]
    pub receipt_nf: Option<String>,
    #[schema(example = "card-slip-0001.jpg")]
    pub receipt_card: Option<String>,
}

impl ExpenseDraft {
    /// Checks mandatory fields and the status code, reporting all failures at once.
    pub fn validate(self, user_id: u64) -> Result<NewExpense, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let description = require_present(&mut errors, "description", self.description);
        let date = require(&mut errors, "date", self.date);
        let amount = require(&mut errors, "amount", self.amount).map(|mut amount| {
            amount.rescale(AMOUNT_SCALE);
            amount
        });
        let location = require_present(&mut errors, "location", self.location);
        let receipt_nf = blank_to_none(self.receipt_nf);
        let receipt_card = blank_to_none(self.receipt_card);

        check_length(&mut errors, "description", description.as_deref(), TEXT_MAX_LEN);
        check_length(&mut errors, "location", location.as_deref(), TEXT_MAX_LEN);
        check_length(&mut errors, "receipt_nf", receipt_nf.as_deref(), TEXT_MAX_LEN);
        check_length(&mut errors, "receipt_card", receipt_card.as_deref(), TEXT_MAX_LEN);

        let limit = Decimal::from(10_u64.pow(AMOUNT_INTEGER_DIGITS));
        if amount.is_some_and(|amount| amount.abs() >= limit) {
            errors.add("amount", format!("must be less than {limit}"));
        }
        let status = require_present(&mut errors, "status", self.status).and_then(|code| {
            match ExpenseStatus::from_str(&code) {
                Ok(status) => Some(status),
                Err(_) => {
                    errors.add("status", format!("{code} is not a valid status"));
                    None
                }
            }
        });

        match (description, date, amount, location, status) {
            (Some(description), Some(date), Some(amount), Some(location), Some(status))
                if errors.is_empty() =>
            {
                Ok(NewExpense {
                    description,
                    date,
                    amount,
                    location,
                    status,
                    user_id,
                    receipt_nf,
                    receipt_card,
                })
            }
            _ => Err(errors),
        }
    }
}

impl Expense {
    /// Overlays the supplied fields of `patch` on the current values.
    pub fn merge(&self, patch: ExpenseDraft) -> ExpenseDraft {
        ExpenseDraft {
            description: patch.description.or_else(|| Some(self.description.clone())),
            date: patch.date.or(Some(self.date)),
            amount: patch.amount.or(Some(self.amount)),
            location: patch.location.or_else(|| Some(self.location.clone())),
            status: patch
                .status
                .or_else(|| Some(self.status.to_string())),
            receipt_nf: patch.receipt_nf.or_else(|| self.receipt_nf.clone()),
            receipt_card: patch.receipt_card.or_else(|| self.receipt_card.clone()),
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
