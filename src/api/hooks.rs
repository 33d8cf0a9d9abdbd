//! Auth provider lifecycle events. Callers must present the service role.
//!
//! `subject-created` records the subject, then provisions its profile unless
//! the client already inserted one. Redelivering the event is harmless: the
//! profile is always built from the first recorded copy of the subject.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::auth::authenticated;
use crate::api::error::ApiError;
use crate::api::extract::JsonBody;
use crate::api::routes::AppState;
use crate::hooks::ProvisionOutcome;
use crate::policy::Requester;
use crate::types::subject::AuthSubject;

#[derive(Debug, Serialize)]
pub struct ProvisionResponse {
    pub outcome: ProvisionOutcome,
}

#[derive(Debug, Deserialize)]
pub struct SubjectDeleted {
    pub id: Uuid,
}

pub async fn subject_created(
    State(state): State<AppState>,
    requester: Requester,
    JsonBody(subject): JsonBody<AuthSubject>,
) -> Result<Json<ProvisionResponse>, ApiError> {
    let requester = authenticated(requester)?;
    state.store.register_subject(&requester, &subject).await?;
    let outcome = state.store.provision_profile(&requester, subject.id).await?;
    Ok(Json(ProvisionResponse { outcome }))
}

pub async fn subject_deleted(
    State(state): State<AppState>,
    requester: Requester,
    JsonBody(event): JsonBody<SubjectDeleted>,
) -> Result<StatusCode, ApiError> {
    let requester = authenticated(requester)?;
    state.store.subject_deleted(&requester, event.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
