use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::extract::PathParam;
use crate::api::{hooks, profiles, trades};
use crate::store::SharedStore;

/// Shared state for handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub jwt_secret: Vec<u8>,
}

async fn health() -> &'static str {
    "healthy"
}

#[derive(Debug, Serialize)]
struct UsernameAvailability {
    username: String,
    available: bool,
}

/// Open to any caller, authenticated or not.
async fn username_available(
    State(state): State<AppState>,
    PathParam(candidate): PathParam<String>,
) -> Result<Json<UsernameAvailability>, ApiError> {
    let available = state.store.check_username(&candidate).await?;
    Ok(Json(UsernameAvailability {
        username: candidate,
        available,
    }))
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/usernames/{candidate}/available", get(username_available))
        .route("/profiles", post(profiles::create_profile))
        .route("/profiles/me", get(profiles::get_my_profile).patch(profiles::update_my_profile))
        .route("/profiles/{id}", get(profiles::get_profile))
        .route("/trades", get(trades::list_trades).post(trades::create_trade))
        .route(
            "/trades/{id}",
            get(trades::get_trade).put(trades::replace_trade).delete(trades::delete_trade),
        )
        .route("/hooks/auth/subject-created", post(hooks::subject_created))
        .route("/hooks/auth/subject-deleted", post(hooks::subject_deleted))
        .with_state(state)
}
