use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use super::error::ApiError;
use crate::application::services::Services;
use crate::auth::AuthenticatedUser;
use crate::domain::entities::trade::TradeHistory;
use crate::domain::entities::trading_account::TradingAccount;

/// Body for registering the caller's trading account outside a join
#[derive(Deserialize)]
pub struct RegisterAccountRequest {
    pub login: i64,
    pub broker: String,
    pub investor_password: String,
}

pub async fn register_trading_account(
    State(services): State<Services>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Json(body): Json<RegisterAccountRequest>,
) -> Result<(StatusCode, Json<TradingAccount>), ApiError> {
    let account = services
        .accounts
        .register(user_id, body.login, &body.broker, &body.investor_password)
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// Account details; the encrypted credential is never serialized
pub async fn get_trading_account(
    State(services): State<Services>,
    Path(login): Path<i64>,
) -> Result<Json<TradingAccount>, ApiError> {
    Ok(Json(services.accounts.get_by_login(login).await?))
}

/// Every recorded trade for a trading account, with its owner's username
pub async fn get_trade_history(
    State(services): State<Services>,
    Path(login): Path<i64>,
) -> Result<Json<TradeHistory>, ApiError> {
    Ok(Json(services.accounts.trade_history(login).await?))
}
