pub mod competition_handler;
pub mod error;
pub mod trading_account_handler;
pub mod user_handler;

use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::application::services::Services;
use crate::auth::{require_admin, require_user, Authenticator};
use competition_handler::*;
use trading_account_handler::{get_trade_history, get_trading_account, register_trading_account};
use user_handler::{create_user, get_user};

/// Largest accepted request body; trade batches are the biggest payload
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Build the HTTP API.
///
/// User routes need a bearer user token, organiser routes an admin API key;
/// reads are public.
pub fn router(services: Services, auth: Arc<Authenticator>, request_timeout: Duration) -> Router {
    let public = Router::new()
        .route("/health", get(health_check))
        .route("/competitions/current", get(get_current_competition))
        .route("/competitions/:id", get(get_competition))
        .route("/competitions/:id/leaderboard", get(get_leaderboard))
        .route("/users/:id", get(get_user))
        .route("/trading-accounts/:login", get(get_trading_account))
        .route("/trading-accounts/:login/trades", get(get_trade_history));

    let user = Router::new()
        .route("/users", post(create_user))
        .route("/trading-accounts", post(register_trading_account))
        .route("/competitions/:id/join", post(join_competition))
        .route("/competitions/:id/me", get(get_membership_state))
        .route("/competitions/:id/account-requests", post(request_account))
        .route_layer(middleware::from_fn_with_state(auth.clone(), require_user));

    let admin = Router::new()
        .route("/competitions", post(create_competition))
        .route(
            "/competitions/:id/members/:login/account-size",
            put(update_account_size),
        )
        .route("/competitions/:id/trades", post(insert_trades))
        .route_layer(middleware::from_fn_with_state(auth, require_admin));

    Router::new()
        .merge(public)
        .merge(user)
        .merge(admin)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(services)
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "running" }))
}
