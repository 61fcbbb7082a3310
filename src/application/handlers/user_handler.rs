use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ApiError;
use crate::application::services::Services;
use crate::auth::AuthenticatedUser;
use crate::domain::entities::user::User;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

/// Register the caller's display name
pub async fn create_user(
    State(services): State<Services>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = services.users.create(user_id, &body.username).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(services.users.get_by_id(id).await?))
}
