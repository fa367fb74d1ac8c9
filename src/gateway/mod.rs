pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Json, Router,
    http::{Method, header},
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};
use utoipa::OpenApi;

use middleware::jwt_auth_middleware;
use state::AppState;

/// Upper bound on request bodies
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDoc::openapi())
}

/// Build the complete `/api/v1` router
///
/// Public: health, login, account creation and reads, balance reads.
/// Private (Bearer token): all transfer routes.
///
/// Balance overwrite is an in-process operation only; no route mints money.
pub fn router(state: Arc<AppState>) -> Router {
    let auth = from_fn_with_state(state.clone(), jwt_auth_middleware);

    // ==========================================================================
    // Public Routes (no auth required)
    // ==========================================================================
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(openapi_json))
        .route("/login", post(handlers::login))
        .route(
            "/accounts",
            post(handlers::create_account).get(handlers::list_accounts),
        )
        .route("/accounts/{id}", get(handlers::get_account))
        .route("/accounts/{id}/balance", get(handlers::get_balance));

    // ==========================================================================
    // Private Routes (auth required)
    // ==========================================================================
    let private_routes = Router::new()
        .route(
            "/transfers",
            post(handlers::create_transfer).get(handlers::list_transfers),
        )
        .route("/transfers/{id}", get(handlers::get_transfer))
        .route_layer(auth);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .nest("/api/v1", public_routes.merge(private_routes))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Serve the gateway on an already-bound listener until `shutdown` resolves
pub async fn run_server<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Gateway listening on http://{}", addr);
        tracing::info!("OpenAPI document: http://{}/api/v1/openapi.json", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
