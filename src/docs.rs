use crate::api::expense::{ExpensePayload, ExpenseResponse, Receipts};
use crate::model::expense::{ExpenseDraft, ExpenseStatus, Person};
use crate::model::role::Role;
use crate::model::tag::{Tag, TagPayload};
use crate::model::user::UserResponse;
use crate::models::{
    Credentials, MessageResponse, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse,
    SignUpUser,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Expense Reimbursement API",
        version = "1.0.0",
        description = r#"
## Expense Reimbursement

Employees record what they spent; their managers review it.

### Key Features
- **Users**
  - Sign up as a manager or as an employee reporting to one
  - Sign in for a bearer token, sign out to revoke every token issued so far
- **Expenses**
  - Create, update, list and delete expenses with receipts and tags
  - Managers see their own expenses and those of their employees
  - Filter by status group, day or period, employee, manager, amount range, text and tags
- **Tags**
  - Shared labels for grouping expenses

### Security
Everything except sign-up, sign-in and sign-out needs `Authorization: Bearer <token>`.
"#,
    ),
    paths(
        crate::auth::handlers::sign_up,
        crate::auth::handlers::sign_in,
        crate::auth::handlers::sign_out,
        crate::auth::handlers::delete_user,

        crate::api::expense::list_expenses,
        crate::api::expense::get_expense,
        crate::api::expense::create_expense,
        crate::api::expense::update_expense,
        crate::api::expense::delete_expense,

        crate::api::tag::list_tags,
        crate::api::tag::get_tag,
        crate::api::tag::create_tag,
        crate::api::tag::update_tag,
        crate::api::tag::delete_tag
    ),
    components(
        schemas(
            SignUpRequest,
            SignUpUser,
            SignUpResponse,
            SignInRequest,
            Credentials,
            SignInResponse,
            MessageResponse,
            UserResponse,
            Role,
            ExpensePayload,
            ExpenseDraft,
            ExpenseResponse,
            ExpenseStatus,
            Person,
            Receipts,
            Tag,
            TagPayload
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Registration and session APIs"),
        (name = "Expenses", description = "Expense management APIs"),
        (name = "Tags", description = "Tag management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
