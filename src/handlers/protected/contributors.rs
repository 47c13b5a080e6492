use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::api::payload::ContributorPayload;
use crate::database::models::Contributor;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::permissions::{is_contributor, AuthorizationContext};
use crate::routes::AppState;

/// GET /projects/:project_id/users
pub async fn list(State(state): State<AppState>, ctx: AuthorizationContext) -> ApiResult<Vec<Contributor>> {
    let grant = state.authorizer().membership(&ctx).await?;
    let contributors = state.store.contributors_of(grant.project.id).await?;
    Ok(ApiResponse::success(contributors))
}

/// POST /projects/:project_id/users - project author only
pub async fn create(
    State(state): State<AppState>,
    ctx: AuthorizationContext,
    payload: Result<Json<ContributorPayload>, JsonRejection>,
) -> ApiResult<Contributor> {
    let grant = state.authorizer().membership(&ctx).await?;
    let Json(payload) = payload?;
    let new = payload.into_new(grant.project.id)?;

    if !state.store.user_exists(new.user_id).await? {
        return Err(ApiError::field_error(
            "user_id",
            format!("Invalid pk \"{}\" - object does not exist.", new.user_id),
        ));
    }
    if is_contributor(state.store.as_ref(), new.user_id, new.project_id).await? {
        return Err(ApiError::field_error(
            "user_id",
            "This user is already a contributor of the project.",
        ));
    }

    let contributor = state.store.add_contributor(new).await?;
    tracing::info!(
        "User {} added user {} to project {}",
        grant.principal,
        contributor.user_id,
        contributor.project_id
    );
    Ok(ApiResponse::created(contributor))
}

/// DELETE /projects/:project_id/users/:user_id - project author only
pub async fn delete(State(state): State<AppState>, ctx: AuthorizationContext) -> ApiResult<()> {
    let grant = state.authorizer().membership(&ctx).await?;
    let contributor = grant
        .contributor
        .ok_or_else(|| ApiError::not_found("contributor not found"))?;

    state
        .store
        .remove_contributor(contributor.user_id, grant.project.id)
        .await?;

    tracing::info!(
        "User {} removed user {} from project {}",
        grant.principal,
        contributor.user_id,
        grant.project.id
    );
    Ok(ApiResponse::no_content())
}
