//! Policy handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use core_kernel::PolicyId;
use domain_policy::{Policy, PolicyStats, RenewalAlert};

use crate::dto::policy::*;
use crate::{error::ApiError, AppState};

/// Lists policies in insertion order
pub async fn list_policies(State(state): State<AppState>) -> Json<PolicyListResponse> {
    Json(PolicyListResponse {
        policies: state.store.policies().await,
        loading: state.store.is_loading().await,
    })
}

/// Gets a policy by ID
pub async fn get_policy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Policy>, ApiError> {
    let id = PolicyId::from_string(id);
    state
        .store
        .policy(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::policy_not_found(&id))
}

/// Adds a policy
pub async fn create_policy(
    State(state): State<AppState>,
    Json(request): Json<CreatePolicyRequest>,
) -> Result<(StatusCode, Json<Policy>), ApiError> {
    request.validate()?;
    let input = request.into_new_policy()?;

    let policy = state.store.add_policy(input).await;
    Ok((StatusCode::CREATED, Json(policy)))
}

/// Applies a partial update
pub async fn update_policy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePolicyRequest>,
) -> Result<Json<Policy>, ApiError> {
    request.validate()?;
    let patch = request.into_patch()?;
    let id = PolicyId::from_string(id);

    state
        .store
        .update_policy(&id, patch)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::policy_not_found(&id))
}

/// Deletes a policy
pub async fn delete_policy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = PolicyId::from_string(id);
    if state.store.delete_policy(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::policy_not_found(&id))
    }
}

/// Portfolio statistics
pub async fn get_stats(State(state): State<AppState>) -> Json<PolicyStats> {
    Json(state.store.stats().await)
}

/// Policies renewing within the configured window, soonest first
pub async fn get_alerts(State(state): State<AppState>) -> Json<Vec<RenewalAlert>> {
    Json(state.store.renewal_alerts().await)
}
