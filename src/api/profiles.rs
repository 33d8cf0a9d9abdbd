//! Profile endpoints. Every route needs an authenticated user.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

use crate::api::auth::authenticated;
use crate::api::error::ApiError;
use crate::api::extract::{JsonBody, PathParam};
use crate::api::routes::AppState;
use crate::policy::{Requester, require_user};
use crate::types::profile::{NewProfile, Profile, ProfileUpdate};

pub async fn create_profile(
    State(state): State<AppState>,
    requester: Requester,
    JsonBody(profile): JsonBody<NewProfile>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let requester = authenticated(requester)?;
    let profile = state.store.insert_profile(&requester, profile).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_my_profile(
    State(state): State<AppState>,
    requester: Requester,
) -> Result<Json<Profile>, ApiError> {
    let requester = authenticated(requester)?;
    let id = require_user(&requester)?;
    Ok(Json(state.store.get_profile(&requester, id).await?))
}

pub async fn get_profile(
    State(state): State<AppState>,
    requester: Requester,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Profile>, ApiError> {
    let requester = authenticated(requester)?;
    Ok(Json(state.store.get_profile(&requester, id).await?))
}

pub async fn update_my_profile(
    State(state): State<AppState>,
    requester: Requester,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> Result<Json<Profile>, ApiError> {
    let requester = authenticated(requester)?;
    let id = require_user(&requester)?;
    Ok(Json(state.store.update_profile(&requester, id, update).await?))
}
