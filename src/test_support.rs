//! Builders shared by the unit and HTTP tests.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::body::BoxBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::test::TestRequest;
use actix_web::web::Data;
use actix_web::{App, Error};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::auth::token;
use crate::config::Config;
use crate::model::expense::{Expense, ExpenseRow, ExpenseStatus, NewExpense, Person};
use crate::model::role::Role;
use crate::model::user::{NewUser, User};
use crate::routes;
use crate::store::Store;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn user(id: u64, role: Role, manager_user_id: Option<u64>) -> User {
    User {
        id,
        email: format!("user{id}@email.com"),
        encrypted_password: String::new(),
        name: format!("User {id}"),
        role,
        manager_user_id,
        active: true,
        revocation_id: format!("marker-{id}"),
    }
}

pub fn new_user(email: &str, role: Role, manager_user_id: Option<u64>) -> NewUser {
    NewUser {
        email: email.to_string(),
        encrypted_password: String::new(),
        name: email.split('@').next().unwrap_or(email).to_string(),
        role,
        manager_user_id,
        active: true,
        revocation_id: token::fresh_revocation_id(),
    }
}

pub fn new_expense(user_id: u64, amount: i64, status: ExpenseStatus, day: NaiveDate) -> NewExpense {
    NewExpense {
        description: format!("Expense of {amount}"),
        date: day,
        amount: Decimal::new(amount * 100, 2),
        location: "Recife".to_string(),
        status,
        user_id,
        receipt_nf: None,
        receipt_card: None,
    }
}

/// A joined row owned by `owner_id` whose owner reports to `manager_id`.
pub fn expense_row(expense_id: u64, owner_id: u64, manager_id: Option<u64>) -> ExpenseRow {
    ExpenseRow {
        expense: Expense {
            id: expense_id,
            description: "Lunch".to_string(),
            date: date(2026, 1, 15),
            amount: Decimal::new(1000, 2),
            location: "Recife".to_string(),
            status: ExpenseStatus::Pending,
            user_id: owner_id,
            receipt_nf: None,
            receipt_card: None,
        },
        employee: Person {
            id: owner_id,
            name: format!("User {owner_id}"),
        },
        manager: manager_id.map(|id| Person {
            id,
            name: format!("User {id}"),
        }),
        tags: Vec::new(),
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "memory://".to_string(),
        jwt_secret: "test-secret".to_string(),
        server_addr: "127.0.0.1:0".to_string(),
        token_ttl: 3_600,
        enforce_revocation: false,
        rate_sign_in_per_min: 1_000,
        rate_sign_up_per_min: 1_000,
        rate_protected_per_min: 1_000,
        api_prefix: String::new(),
        log_dir: "logs".to_string(),
        log_level: "debug".to_string(),
    }
}

/// The routed application without logging or docs.
pub fn test_app(
    store: Arc<dyn Store>,
    config: Config,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(Data::new(config.clone()))
        .app_data(Data::from(store))
        .configure(move |cfg| routes::configure(cfg, config))
}

/// Rate limiting keys on the peer address, so every test request needs one.
pub fn peer(req: TestRequest) -> TestRequest {
    let addr: SocketAddr = "127.0.0.1:40000".parse().unwrap();
    req.peer_addr(addr)
}

pub fn bearer(user: &User, config: &Config) -> (&'static str, String) {
    let token = token::issue(user, config).unwrap();
    ("Authorization", format!("Bearer {token}"))
}
