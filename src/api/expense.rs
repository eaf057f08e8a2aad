use std::str::FromStr;

use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::filter::{ExpenseFilter, Scope, StatusGroup, filter_expenses};
use crate::model::expense::{ExpenseDraft, ExpenseRow, ExpenseStatus, Person};
use crate::model::user::User;
use crate::store::{Store, distinct_tag_ids};
use crate::utils::validation::ValidationErrors;

/// Raw listing parameters. Everything arrives as text so that a bad value
/// becomes a validation error instead of a generic query rejection.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpenseQuery {
    /// P for pending, H for approved or declined
    #[serde(rename = "type")]
    pub status_group: Option<String>,
    /// Exact day (YYYY-MM-DD)
    pub date: Option<String>,
    /// Range start; runs until today when final_date is absent
    pub start_date: Option<String>,
    /// Range end
    pub final_date: Option<String>,
    /// Owner of the expense
    pub employee_id: Option<String>,
    /// Manager of the owner
    pub manager_user_id: Option<String>,
    /// Lower amount bound; needs max_amount
    pub min_amount: Option<String>,
    /// Upper amount bound; needs min_amount
    pub max_amount: Option<String>,
    /// Case-insensitive description search
    pub text_filter: Option<String>,
    /// Comma-separated tag ids; any of them matches
    pub tags: Option<String>,
}

impl ExpenseQuery {
    pub fn into_filter(self) -> Result<ExpenseFilter, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let filter = ExpenseFilter {
            status_group: present(self.status_group).and_then(|code| StatusGroup::from_code(&code)),
            date: parse_param(&mut errors, "date", self.date),
            start_date: parse_param(&mut errors, "start_date", self.start_date),
            final_date: parse_param(&mut errors, "final_date", self.final_date),
            employee_id: parse_param(&mut errors, "employee_id", self.employee_id),
            manager_user_id: parse_param(&mut errors, "manager_user_id", self.manager_user_id),
            min_amount: parse_param(&mut errors, "min_amount", self.min_amount),
            max_amount: parse_param(&mut errors, "max_amount", self.max_amount),
            text_filter: present(self.text_filter),
            tags: parse_tag_list(&mut errors, self.tags),
        };

        errors.finish(filter)
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_param<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
) -> Option<T> {
    let raw = present(value)?;
    match raw.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            errors.add(field, format!("{raw} is invalid"));
            None
        }
    }
}

fn parse_tag_list(errors: &mut ValidationErrors, value: Option<String>) -> Vec<u64> {
    let Some(raw) = present(value) else {
        return Vec::new();
    };

    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse() {
            Ok(id) => ids.push(id),
            Err(_) => errors.add("tags", format!("{part} is invalid")),
        }
    }
    ids
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExpensePayload {
    #[serde(default)]
    pub expense: ExpenseDraft,
    /// Tag ids. Omit to keep the current set on update; `[]` clears it.
    #[schema(example = json!([1, 2]))]
    pub tags: Option<Vec<u64>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Receipts {
    #[schema(example = "invoice-0001.pdf")]
    pub receipt_nf: Option<String>,
    #[schema(example = "card-slip-0001.jpg")]
    pub receipt_card: Option<String>,
}

/// What clients see of an expense.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExpenseResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Taxi to airport")]
    pub description: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "42.50", value_type = String)]
    pub amount: Decimal,
    #[schema(example = "Recife")]
    pub location: String,
    pub status: ExpenseStatus,
    #[schema(nullable = true)]
    pub manager: Option<Person>,
    pub employee: Person,
    /// Tag descriptions.
    #[schema(example = json!(["Travel"]))]
    pub tags: Vec<String>,
    pub receipts: Receipts,
}

impl From<ExpenseRow> for ExpenseResponse {
    fn from(row: ExpenseRow) -> Self {
        let expense = row.expense;
        ExpenseResponse {
            id: expense.id,
            description: expense.description,
            date: expense.date,
            amount: expense.amount,
            location: expense.location,
            status: expense.status,
            manager: row.manager,
            employee: row.employee,
            tags: row.tags.into_iter().map(|t| t.description).collect(),
            receipts: Receipts {
                receipt_nf: expense.receipt_nf,
                receipt_card: expense.receipt_card,
            },
        }
    }
}

/// Loads an expense the actor may act on; anything outside the scope is absent.
async fn find_in_scope(store: &dyn Store, actor: &User, id: u64) -> Result<ExpenseRow, ApiError> {
    let scope = Scope::for_actor(actor);
    match store.find_expense(id).await? {
        Some(row) if scope.permits(&row) => Ok(row),
        Some(_) => {
            debug!(expense_id = id, actor = actor.id, "Expense outside actor scope");
            Err(ApiError::not_found("Expense"))
        }
        None => Err(ApiError::not_found("Expense")),
    }
}

/// Validation errors for tag ids that do not exist.
async fn unknown_tags(store: &dyn Store, tag_ids: &[u64]) -> Result<ValidationErrors, ApiError> {
    let mut errors = ValidationErrors::new();
    if tag_ids.is_empty() {
        return Ok(errors);
    }

    let found = store.find_tags(tag_ids).await?;
    for id in distinct_tag_ids(tag_ids) {
        if !found.iter().any(|t| t.id == id) {
            errors.add("tags", format!("{id} is not a valid tag"));
        }
    }
    Ok(errors)
}

#[utoipa::path(
    get,
    path = "/expenses",
    params(ExpenseQuery),
    responses(
        (status = 200, description = "Expenses visible to the caller", body = [ExpenseResponse]),
        (status = 422, description = "Unparseable filter value")
    ),
    tag = "Expenses",
    security(
        ("bearer_auth" = [])
    )
)]
#[instrument(name = "expenses_list", skip(store, auth, query), fields(actor = auth.id))]
pub async fn list_expenses(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<ExpenseQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = query.into_inner().into_filter()?;
    let today = Local::now().date_naive();

    let rows = filter_expenses(store.get_ref(), &auth, &filter, today).await?;
    debug!(count = rows.len(), "Expenses listed");

    let body: Vec<ExpenseResponse> = rows.into_iter().map(ExpenseResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/expenses/{id}",
    params(("id", Path, description = "Expense id")),
    responses(
        (status = 200, description = "Expense", body = ExpenseResponse),
        (status = 404, description = "Expense not found")
    ),
    tag = "Expenses",
    security(
        ("bearer_auth" = [])
    )
)]
#[instrument(name = "expenses_show", skip(store, auth), fields(actor = auth.id))]
pub async fn get_expense(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let row = find_in_scope(store.get_ref(), &auth, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ExpenseResponse::from(row)))
}

#[utoipa::path(
    post,
    path = "/expenses",
    request_body = ExpensePayload,
    responses(
        (status = 201, description = "Expense created", body = ExpenseResponse),
        (status = 422, description = "Validation failed", body = Object, example = json!({
            "error": "Validation failed",
            "errors": {"status": ["X is not a valid status"]}
        }))
    ),
    tag = "Expenses",
    security(
        ("bearer_auth" = [])
    )
)]
#[instrument(name = "expenses_create", skip(store, auth, payload), fields(actor = auth.id))]
pub async fn create_expense(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<ExpensePayload>,
) -> Result<HttpResponse, ApiError> {
    let ExpensePayload { expense, tags } = payload.into_inner();
    let tags = tags.unwrap_or_default();

    let tag_errors = unknown_tags(store.get_ref(), &tags).await?;
    let new_expense = tag_errors.combine(expense.validate(auth.id))?;

    let id = store.insert_expense(new_expense, &tags).await?;
    info!(expense_id = id, "Expense created");

    let row = store
        .find_expense(id)
        .await?
        .ok_or_else(|| ApiError::internal(format!("expense {id} vanished after insert")))?;

    Ok(HttpResponse::Created()
        .insert_header(("Location", format!("/expenses/{id}")))
        .json(ExpenseResponse::from(row)))
}

#[utoipa::path(
    patch,
    path = "/expenses/{id}",
    params(("id", Path, description = "Expense id")),
    request_body = ExpensePayload,
    responses(
        (status = 200, description = "Expense updated", body = ExpenseResponse),
        (status = 404, description = "Expense not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Expenses",
    security(
        ("bearer_auth" = [])
    )
)]
#[instrument(name = "expenses_update", skip(store, auth, payload), fields(actor = auth.id))]
pub async fn update_expense(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<ExpensePayload>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let current = find_in_scope(store.get_ref(), &auth, id).await?;
    let ExpensePayload { expense, tags } = payload.into_inner();

    let tag_errors = match &tags {
        Some(tags) => unknown_tags(store.get_ref(), tags).await?,
        None => ValidationErrors::new(),
    };
    let merged = current.expense.merge(expense);
    let updated = tag_errors
        .combine(merged.validate(current.expense.user_id))?
        .with_id(id);

    store.update_expense(&updated, tags.as_deref()).await?;
    info!(expense_id = id, "Expense updated");

    let row = find_in_scope(store.get_ref(), &auth, id).await?;
    Ok(HttpResponse::Ok().json(ExpenseResponse::from(row)))
}

#[utoipa::path(
    delete,
    path = "/expenses/{id}",
    params(("id", Path, description = "Expense id")),
    responses(
        (status = 204, description = "Expense deleted"),
        (status = 404, description = "Expense not found")
    ),
    tag = "Expenses",
    security(
        ("bearer_auth" = [])
    )
)]
#[instrument(name = "expenses_delete", skip(store, auth), fields(actor = auth.id))]
pub async fn delete_expense(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    find_in_scope(store.get_ref(), &auth, id).await?;

    if !store.delete_expense(id).await? {
        return Err(ApiError::not_found("Expense"));
    }

    info!(expense_id = id, "Expense deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    use super::*;
    use crate::config::Config;
    use crate::model::role::Role;
    use crate::store::MemoryStore;
    use crate::test_support::{bearer, date, new_expense, new_user, peer, test_app, test_config};

    struct Seeded {
        store: Arc<dyn Store>,
        config: Config,
        manager: User,
        employees: [User; 2],
        outsider: User,
    }

    /// Manager M with employees E1 (10 P, 20 A, 30 D) and E2 (40 P, 50 A, 60 D),
    /// plus an unrelated manager with one expense of their own.
    async fn seeded() -> Seeded {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let manager = store
            .insert_user(new_user("m@email.com", Role::Manager, None))
            .await
            .unwrap();
        let e1 = store
            .insert_user(new_user("e1@email.com", Role::Employee, Some(manager.id)))
            .await
            .unwrap();
        let e2 = store
            .insert_user(new_user("e2@email.com", Role::Employee, Some(manager.id)))
            .await
            .unwrap();
        let outsider = store
            .insert_user(new_user("o@email.com", Role::Manager, None))
            .await
            .unwrap();

        let statuses = [ExpenseStatus::Pending, ExpenseStatus::Approved, ExpenseStatus::Declined];
        for (owner, amounts) in [(&e1, [10, 20, 30]), (&e2, [40, 50, 60])] {
            for (i, (amount, status)) in amounts.into_iter().zip(statuses).enumerate() {
                let day = date(2026, 3, 1 + i as u32);
                store
                    .insert_expense(new_expense(owner.id, amount, status, day), &[])
                    .await
                    .unwrap();
            }
        }
        store
            .insert_expense(
                new_expense(outsider.id, 15, ExpenseStatus::Pending, date(2026, 3, 1)),
                &[],
            )
            .await
            .unwrap();

        Seeded {
            store,
            config: test_config(),
            manager,
            employees: [e1, e2],
            outsider,
        }
    }

    async fn get_json(s: &Seeded, actor: &User, uri: &str) -> (u16, Value) {
        let app = actix_test::init_service(test_app(s.store.clone(), s.config.clone())).await;
        let req = peer(actix_test::TestRequest::get().uri(uri))
            .insert_header(bearer(actor, &s.config))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        let status = resp.status().as_u16();
        (status, actix_test::read_body_json(resp).await)
    }

    fn amounts(body: &Value) -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|e| e["amount"].as_str().unwrap().to_string())
            .collect()
    }

    #[actix_web::test]
    async fn pending_group_for_manager() {
        let s = seeded().await;
        let (status, body) = get_json(&s, &s.manager, "/expenses?type=P").await;
        assert_eq!(status, 200);
        assert_eq!(amounts(&body), vec!["10.00", "40.00"]);
    }

    #[actix_web::test]
    async fn history_group_for_manager() {
        let s = seeded().await;
        let (_, body) = get_json(&s, &s.manager, "/expenses?type=H").await;
        assert_eq!(amounts(&body), vec!["20.00", "30.00", "50.00", "60.00"]);
    }

    #[actix_web::test]
    async fn amount_range_is_inclusive() {
        let s = seeded().await;
        let (_, body) = get_json(&s, &s.manager, "/expenses?min_amount=0&max_amount=50").await;
        assert_eq!(amounts(&body), vec!["10.00", "20.00", "30.00", "40.00", "50.00"]);
    }

    #[actix_web::test]
    async fn manager_sees_team_but_not_outsiders() {
        let s = seeded().await;
        let (_, body) = get_json(&s, &s.manager, "/expenses").await;
        assert_eq!(body.as_array().unwrap().len(), 6);

        // narrowing to another manager's team cannot widen the scope
        let uri = format!("/expenses?manager_user_id={}", s.outsider.id);
        let (_, body) = get_json(&s, &s.manager, &uri).await;
        assert!(body.as_array().unwrap().is_empty());

        let (_, body) = get_json(&s, &s.outsider, "/expenses").await;
        assert_eq!(amounts(&body), vec!["15.00"]);
    }

    #[actix_web::test]
    async fn employee_sees_only_own_expenses() {
        let s = seeded().await;
        let e2 = &s.employees[1];
        let (_, body) = get_json(&s, e2, "/expenses").await;
        assert_eq!(amounts(&body), vec!["40.00", "50.00", "60.00"]);

        let uri = format!("/expenses?employee_id={}", s.employees[0].id);
        let (_, body) = get_json(&s, e2, &uri).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn filters_combine_and_rows_are_projected() {
        let s = seeded().await;
        let e1 = &s.employees[0];
        let uri = format!(
            "/expenses?employee_id={}&start_date=2026-03-02&final_date=2026-03-03&text_filter=EXPENSE",
            e1.id
        );
        let (_, body) = get_json(&s, &s.manager, &uri).await;
        assert_eq!(amounts(&body), vec!["20.00", "30.00"]);

        let first = &body[0];
        assert_eq!(first["status"], "A");
        assert_eq!(first["date"], "2026-03-02");
        assert_eq!(first["employee"], json!({"id": e1.id, "name": e1.name}));
        assert_eq!(first["manager"], json!({"id": s.manager.id, "name": s.manager.name}));
        assert_eq!(first["tags"], json!([]));
        assert_eq!(first["receipts"], json!({"receipt_nf": null, "receipt_card": null}));
    }

    #[actix_web::test]
    async fn lone_final_date_is_an_upper_bound() {
        let s = seeded().await;
        let (_, body) = get_json(&s, &s.manager, "/expenses?final_date=2026-03-01").await;
        assert_eq!(amounts(&body), vec!["10.00", "40.00"]);
    }

    #[actix_web::test]
    async fn listing_is_repeatable() {
        let s = seeded().await;
        let (_, first) = get_json(&s, &s.manager, "/expenses?type=H&min_amount=1&max_amount=99").await;
        let (_, second) = get_json(&s, &s.manager, "/expenses?type=H&min_amount=1&max_amount=99").await;
        assert_eq!(first, second);
    }

    #[actix_web::test]
    async fn blank_values_are_ignored_and_bad_values_rejected() {
        let s = seeded().await;
        let (status, body) = get_json(&s, &s.manager, "/expenses?date=&tags=&type=").await;
        assert_eq!(status, 200);
        assert_eq!(body.as_array().unwrap().len(), 6);

        let (status, body) = get_json(&s, &s.manager, "/expenses?date=yesterday&min_amount=abc").await;
        assert_eq!(status, 422);
        assert!(body["errors"]["date"].is_array());
        assert!(body["errors"]["min_amount"].is_array());
    }

    #[actix_web::test]
    async fn listing_requires_a_token() {
        let s = seeded().await;
        let app = actix_test::init_service(test_app(s.store.clone(), s.config.clone())).await;
        let req = peer(actix_test::TestRequest::get().uri("/expenses")).to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), 401);
    }

    #[actix_web::test]
    async fn create_rejects_unknown_status() {
        let s = seeded().await;
        let app = actix_test::init_service(test_app(s.store.clone(), s.config.clone())).await;
        let req = peer(actix_test::TestRequest::post().uri("/expenses"))
            .insert_header(bearer(&s.employees[0], &s.config))
            .set_json(json!({"expense": {
                "description": "Lunch",
                "date": "2026-03-10",
                "amount": "12.5",
                "location": "Recife",
                "status": "X"
            }}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 422);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["errors"]["status"], json!(["X is not a valid status"]));
    }

    #[actix_web::test]
    async fn oversized_values_are_field_errors() {
        let s = seeded().await;
        let app = actix_test::init_service(test_app(s.store.clone(), s.config.clone())).await;
        let req = peer(actix_test::TestRequest::post().uri("/expenses"))
            .insert_header(bearer(&s.employees[0], &s.config))
            .set_json(json!({"expense": {
                "description": "d".repeat(300),
                "date": "2026-03-10",
                "amount": "10000000000",
                "location": "Recife",
                "status": "P"
            }}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 422);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["errors"]["amount"], json!(["must be less than 10000000000"]));
        assert_eq!(
            body["errors"]["description"],
            json!(["is too long (maximum is 255 characters)"])
        );
    }

    #[actix_web::test]
    async fn create_update_and_delete_with_tags() {
        let s = seeded().await;
        let food = s.store.insert_tag("Food").await.unwrap();
        let travel = s.store.insert_tag("Travel").await.unwrap();
        let owner = &s.employees[0];
        let app = actix_test::init_service(test_app(s.store.clone(), s.config.clone())).await;

        let req = peer(actix_test::TestRequest::post().uri("/expenses"))
            .insert_header(bearer(owner, &s.config))
            .set_json(json!({
                "expense": {
                    "description": "Dinner",
                    "date": "2026-03-10",
                    "amount": 12.5,
                    "location": "Recife",
                    "status": "P",
                    "receipt_nf": "nf-1.pdf"
                },
                "tags": [food.id]
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: Value = actix_test::read_body_json(resp).await;
        let id = body["id"].as_u64().unwrap();
        assert_eq!(body["amount"], "12.50");
        assert_eq!(body["tags"], json!(["Food"]));
        assert_eq!(body["receipts"]["receipt_nf"], "nf-1.pdf");

        // fields and tags not supplied stay as they were
        let req = peer(actix_test::TestRequest::patch().uri(&format!("/expenses/{id}")))
            .insert_header(bearer(&s.manager, &s.config))
            .set_json(json!({"expense": {"status": "A"}}))
            .to_request();
        let body: Value = actix_test::read_body_json(actix_test::call_service(&app, req).await).await;
        assert_eq!(body["status"], "A");
        assert_eq!(body["description"], "Dinner");
        assert_eq!(body["tags"], json!(["Food"]));
        assert_eq!(body["employee"]["id"], owner.id);

        let req = peer(actix_test::TestRequest::patch().uri(&format!("/expenses/{id}")))
            .insert_header(bearer(owner, &s.config))
            .set_json(json!({"expense": {}, "tags": [travel.id, 999]}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 422);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["errors"]["tags"], json!(["999 is not a valid tag"]));

        let req = peer(actix_test::TestRequest::patch().uri(&format!("/expenses/{id}")))
            .insert_header(bearer(owner, &s.config))
            .set_json(json!({"expense": {}, "tags": []}))
            .to_request();
        let body: Value = actix_test::read_body_json(actix_test::call_service(&app, req).await).await;
        assert_eq!(body["tags"], json!([]));

        // outside the caller's scope the expense does not exist
        let req = peer(actix_test::TestRequest::get().uri(&format!("/expenses/{id}")))
            .insert_header(bearer(&s.outsider, &s.config))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), 404);

        let req = peer(actix_test::TestRequest::delete().uri(&format!("/expenses/{id}")))
            .insert_header(bearer(&s.employees[1], &s.config))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), 404);

        let req = peer(actix_test::TestRequest::delete().uri(&format!("/expenses/{id}")))
            .insert_header(bearer(owner, &s.config))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), 204);
        assert!(s.store.find_expense(id).await.unwrap().is_none());
    }

    #[test]
    fn query_parsing() {
        let filter = ExpenseQuery {
            status_group: Some("H".into()),
            tags: Some("3, 4,,5".into()),
            text_filter: Some("  taxi ".into()),
            ..ExpenseQuery::default()
        }
        .into_filter()
        .unwrap();

        assert_eq!(filter.status_group, Some(StatusGroup::History));
        assert_eq!(filter.tags, vec![3, 4, 5]);
        assert_eq!(filter.text_filter.as_deref(), Some("taxi"));

        let unknown_group = ExpenseQuery {
            status_group: Some("Z".into()),
            ..ExpenseQuery::default()
        };
        assert_eq!(unknown_group.into_filter().unwrap(), ExpenseFilter::default());

        let err = ExpenseQuery {
            tags: Some("1,two".into()),
            ..ExpenseQuery::default()
        }
        .into_filter()
        .unwrap_err();
        assert_eq!(err.get("tags"), Some(&["two is invalid".to_string()][..]));
    }
}
