use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::api::payload::{IssuePayload, UpdateMode};
use crate::database::models::{Issue, ProjectId, UserId};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::permissions::{is_contributor, AuthorizationContext};
use crate::routes::AppState;

/// GET /projects/:project_id/issues
pub async fn list(State(state): State<AppState>, ctx: AuthorizationContext) -> ApiResult<Vec<Issue>> {
    let grant = state.authorizer().issue(&ctx).await?;
    let issues = state.store.issues_of(grant.project.id).await?;
    Ok(ApiResponse::success(issues))
}

/// POST /projects/:project_id/issues
///
/// Project and author come from the path and the token. Without an explicit
/// assignee the issue is assigned to its author.
pub async fn create(
    State(state): State<AppState>,
    ctx: AuthorizationContext,
    payload: Result<Json<IssuePayload>, JsonRejection>,
) -> ApiResult<Issue> {
    let grant = state.authorizer().issue(&ctx).await?;
    let Json(payload) = payload?;
    let new = payload.into_new(grant.project.id, grant.principal)?;

    ensure_assignable(&state, new.assignee_user_id, grant.project.id).await?;

    let issue = state.store.create_issue(new).await?;
    Ok(ApiResponse::created(issue))
}

/// GET /projects/:project_id/issues/:issue_id
pub async fn get(State(state): State<AppState>, ctx: AuthorizationContext) -> ApiResult<Issue> {
    let grant = state.authorizer().issue(&ctx).await?;
    let issue = grant.issue.ok_or_else(|| ApiError::not_found("issue not found"))?;
    Ok(ApiResponse::success(issue))
}

/// PUT /projects/:project_id/issues/:issue_id
pub async fn put(
    State(state): State<AppState>,
    ctx: AuthorizationContext,
    payload: Result<Json<IssuePayload>, JsonRejection>,
) -> ApiResult<Issue> {
    update(state, ctx, payload, UpdateMode::Replace).await
}

/// PATCH /projects/:project_id/issues/:issue_id
pub async fn patch(
    State(state): State<AppState>,
    ctx: AuthorizationContext,
    payload: Result<Json<IssuePayload>, JsonRejection>,
) -> ApiResult<Issue> {
    update(state, ctx, payload, UpdateMode::Merge).await
}

async fn update(
    state: AppState,
    ctx: AuthorizationContext,
    payload: Result<Json<IssuePayload>, JsonRejection>,
    mode: UpdateMode,
) -> ApiResult<Issue> {
    let grant = state.authorizer().issue(&ctx).await?;
    let current = grant.issue.ok_or_else(|| ApiError::not_found("issue not found"))?;
    let Json(payload) = payload?;

    let previous_assignee = current.assignee_user_id;
    let issue = payload.apply(current, mode)?;
    if issue.assignee_user_id != previous_assignee {
        ensure_assignable(&state, issue.assignee_user_id, grant.project.id).await?;
    }

    let issue = state.store.update_issue(&issue).await?;
    Ok(ApiResponse::success(issue))
}

/// DELETE /projects/:project_id/issues/:issue_id - cascades to comments
pub async fn delete(State(state): State<AppState>, ctx: AuthorizationContext) -> ApiResult<()> {
    let grant = state.authorizer().issue(&ctx).await?;
    let issue = grant.issue.ok_or_else(|| ApiError::not_found("issue not found"))?;

    state.store.delete_issue(issue.id).await?;
    Ok(ApiResponse::no_content())
}

async fn ensure_assignable(state: &AppState, assignee: UserId, project_id: ProjectId) -> Result<(), ApiError> {
    if is_contributor(state.store.as_ref(), assignee, project_id).await? {
        Ok(())
    } else {
        Err(ApiError::field_error(
            "assignee_user_id",
            "The assignee must be a contributor of the project.",
        ))
    }
}
