//! OpenAPI Documentation
//!
//! Auto-generated OpenAPI 3.0 document for the bank API, served at
//! `/api/v1/openapi.json` and exported by the `export_openapi` binary.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::access::{AccountDescription, Credential};
use crate::account::{Account, BalanceView, NewAccount};
use crate::gateway::handlers::{HealthResponse, LoginResponse};
use crate::transfer::{Transfer, TransferInput};

/// JWT bearer security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let mut bearer = Http::new(HttpAuthScheme::Bearer);
            bearer.bearer_format = Some("JWT".to_string());
            bearer.description = Some("Token from POST /api/v1/login".to_string());
            components.add_security_scheme("bearer_auth", SecurityScheme::Http(bearer));
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bank Transfer API",
        version = "1.0.0",
        description = "Accounts and transactional transfers. Money is always an integer number of cents.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::auth::login,
        crate::gateway::handlers::account::create_account,
        crate::gateway::handlers::account::list_accounts,
        crate::gateway::handlers::account::get_account,
        crate::gateway::handlers::account::get_balance,
        crate::gateway::handlers::transfer::create_transfer,
        crate::gateway::handlers::transfer::list_transfers,
        crate::gateway::handlers::transfer::get_transfer,
    ),
    components(
        schemas(
            HealthResponse,
            LoginResponse,
            Credential,
            AccountDescription,
            Account,
            NewAccount,
            BalanceView,
            Transfer,
            TransferInput,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Session tokens"),
        (name = "Account", description = "Account creation and balances"),
        (name = "Transfer", description = "Transfers from the session account (auth required)"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;
