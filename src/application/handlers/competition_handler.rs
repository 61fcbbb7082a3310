use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ApiError;
use crate::application::services::Services;
use crate::auth::AuthenticatedUser;
use crate::domain::entities::competition::{Competition, NewCompetition};
use crate::domain::entities::leaderboard::LeaderboardEntry;
use crate::domain::entities::member::{CompetitionMember, MembershipState};
use crate::domain::entities::trade::Trade;

/// Body of a join request. The investor password is encrypted before storage.
#[derive(Deserialize)]
pub struct JoinRequest {
    pub login: i64,
    pub broker: String,
    pub investor_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountSizeRequest {
    pub account_size: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TradeBatchRequest {
    pub login: i64,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TradeBatchResponse {
    pub inserted: usize,
}

/// Query parameters for the leaderboard endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    /// Entries per page (default 50, max 200)
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn create_competition(
    State(services): State<Services>,
    Json(body): Json<NewCompetition>,
) -> Result<(StatusCode, Json<Competition>), ApiError> {
    let competition = services.competitions.create(body).await?;
    Ok((StatusCode::CREATED, Json(competition)))
}

pub async fn get_current_competition(
    State(services): State<Services>,
) -> Result<Json<Competition>, ApiError> {
    Ok(Json(services.competitions.get_current().await?))
}

pub async fn get_competition(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<Competition>, ApiError> {
    Ok(Json(services.competitions.get_by_id(id).await?))
}

pub async fn join_competition(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Json(body): Json<JoinRequest>,
) -> Result<(StatusCode, Json<CompetitionMember>), ApiError> {
    let member = services
        .membership
        .join(id, user_id, body.login, &body.broker, &body.investor_password)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn get_membership_state(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> Result<Json<MembershipState>, ApiError> {
    Ok(Json(services.membership.membership_state(id, user_id).await?))
}

pub async fn request_account(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> Result<StatusCode, ApiError> {
    services.membership.request_account(id, user_id).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn update_account_size(
    State(services): State<Services>,
    Path((id, login)): Path<(Uuid, i64)>,
    Json(body): Json<AccountSizeRequest>,
) -> Result<Json<CompetitionMember>, ApiError> {
    let member = services
        .membership
        .update_account_size(id, login, body.account_size)
        .await?;
    Ok(Json(member))
}

pub async fn insert_trades(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
    Json(body): Json<TradeBatchRequest>,
) -> Result<(StatusCode, Json<TradeBatchResponse>), ApiError> {
    let inserted = services
        .trades
        .insert_trades(id, body.login, &body.trades)
        .await?;
    Ok((StatusCode::CREATED, Json(TradeBatchResponse { inserted })))
}

pub async fn get_leaderboard(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let entries = services
        .leaderboard
        .get_leaderboard(id, params.limit.unwrap_or(0), params.offset.unwrap_or(0))
        .await?;
    Ok(Json(entries))
}
