//! Trade endpoints, scoped to the caller's own rows.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::api::auth::authenticated;
use crate::api::error::ApiError;
use crate::api::extract::{JsonBody, PathParam, QueryParams};
use crate::api::routes::AppState;
use crate::policy::Requester;
use crate::types::trade::{Trade, TradeFields, TradeFilter, TradeId};

pub async fn create_trade(
    State(state): State<AppState>,
    requester: Requester,
    JsonBody(fields): JsonBody<TradeFields>,
) -> Result<(StatusCode, Json<Trade>), ApiError> {
    let requester = authenticated(requester)?;
    let trade = state.store.insert_trade(&requester, fields).await?;
    Ok((StatusCode::CREATED, Json(trade)))
}

pub async fn list_trades(
    State(state): State<AppState>,
    requester: Requester,
    QueryParams(filter): QueryParams<TradeFilter>,
) -> Result<Json<Vec<Trade>>, ApiError> {
    let requester = authenticated(requester)?;
    Ok(Json(state.store.list_trades(&requester, &filter).await?))
}

pub async fn get_trade(
    State(state): State<AppState>,
    requester: Requester,
    PathParam(id): PathParam<TradeId>,
) -> Result<Json<Trade>, ApiError> {
    let requester = authenticated(requester)?;
    Ok(Json(state.store.get_trade(&requester, id).await?))
}

/// Full replacement of the editable fields. Server-maintained columns in the
/// body (`id`, `user_id`, `created_at`, `updated_at`) are ignored.
pub async fn replace_trade(
    State(state): State<AppState>,
    requester: Requester,
    PathParam(id): PathParam<TradeId>,
    JsonBody(fields): JsonBody<TradeFields>,
) -> Result<Json<Trade>, ApiError> {
    let requester = authenticated(requester)?;
    Ok(Json(state.store.update_trade(&requester, id, fields).await?))
}

pub async fn delete_trade(
    State(state): State<AppState>,
    requester: Requester,
    PathParam(id): PathParam<TradeId>,
) -> Result<StatusCode, ApiError> {
    let requester = authenticated(requester)?;
    state.store.delete_trade(&requester, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
