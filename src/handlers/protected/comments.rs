use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::api::payload::{CommentPayload, UpdateMode};
use crate::database::models::Comment;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::permissions::AuthorizationContext;
use crate::routes::AppState;

pub async fn list(State(state): State<AppState>, ctx: AuthorizationContext) -> ApiResult<Vec<Comment>> {
    let grant = state.authorizer().comment(&ctx).await?;
    let comments = state.store.comments_of(grant.issue.id).await?;
    Ok(ApiResponse::success(comments))
}

pub async fn create(
    State(state): State<AppState>,
    ctx: AuthorizationContext,
    payload: Result<Json<CommentPayload>, JsonRejection>,
) -> ApiResult<Comment> {
    let grant = state.authorizer().comment(&ctx).await?;
    let Json(payload) = payload?;

    let comment = state
        .store
        .create_comment(payload.into_new(grant.issue.id, grant.principal)?)
        .await?;
    Ok(ApiResponse::created(comment))
}

pub async fn get(State(state): State<AppState>, ctx: AuthorizationContext) -> ApiResult<Comment> {
    let grant = state.authorizer().comment(&ctx).await?;
    let comment = grant.comment.ok_or_else(|| ApiError::not_found("comment not found"))?;
    Ok(ApiResponse::success(comment))
}

pub async fn put(
    State(state): State<AppState>,
    ctx: AuthorizationContext,
    payload: Result<Json<CommentPayload>, JsonRejection>,
) -> ApiResult<Comment> {
    update(state, ctx, payload, UpdateMode::Replace).await
}

pub async fn patch(
    State(state): State<AppState>,
    ctx: AuthorizationContext,
    payload: Result<Json<CommentPayload>, JsonRejection>,
) -> ApiResult<Comment> {
    update(state, ctx, payload, UpdateMode::Merge).await
}

async fn update(
    state: AppState,
    ctx: AuthorizationContext,
    payload: Result<Json<CommentPayload>, JsonRejection>,
    mode: UpdateMode,
) -> ApiResult<Comment> {
    let grant = state.authorizer().comment(&ctx).await?;
    let current = grant.comment.ok_or_else(|| ApiError::not_found("comment not found"))?;
    let Json(payload) = payload?;

    let comment = payload.apply(current, mode)?;
    let comment = state.store.update_comment(&comment).await?;
    Ok(ApiResponse::success(comment))
}

pub async fn delete(State(state): State<AppState>, ctx: AuthorizationContext) -> ApiResult<()> {
    let grant = state.authorizer().comment(&ctx).await?;
    let comment = grant.comment.ok_or_else(|| ApiError::not_found("comment not found"))?;

    state.store.delete_comment(comment.id).await?;
    Ok(ApiResponse::no_content())
}
