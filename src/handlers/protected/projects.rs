use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::api::payload::{ProjectPayload, UpdateMode};
use crate::database::models::{NewContributor, Project};
use crate::middleware::{ApiResponse, ApiResult};
use crate::permissions::AuthorizationContext;
use crate::routes::AppState;

/// Role given to a project author when authors are enrolled on creation
pub const AUTHOR_ROLE: &str = "author";

/// GET /projects - projects the caller is a contributor of
pub async fn list(State(state): State<AppState>, ctx: AuthorizationContext) -> ApiResult<Vec<Project>> {
    let principal = ctx.authenticate()?;
    let projects = state.store.projects_for_contributor(principal).await?;
    Ok(ApiResponse::success(projects))
}

/// POST /projects - any authenticated user; the caller becomes the author
pub async fn create(
    State(state): State<AppState>,
    ctx: AuthorizationContext,
    payload: Result<Json<ProjectPayload>, JsonRejection>,
) -> ApiResult<Project> {
    let principal = ctx.authenticate()?;
    let Json(payload) = payload?;

    let project = state.store.create_project(payload.into_new(principal)?).await?;

    if state.permissions.auto_enroll_author {
        state
            .store
            .add_contributor(NewContributor {
                user_id: principal,
                project_id: project.id,
                role: AUTHOR_ROLE.to_string(),
            })
            .await?;
    }

    tracing::info!("User {} created project {}", principal, project.id);
    Ok(ApiResponse::created(project))
}

/// GET /projects/:project_id
pub async fn get(State(state): State<AppState>, ctx: AuthorizationContext) -> ApiResult<Project> {
    let grant = state.authorizer().project(&ctx).await?;
    Ok(ApiResponse::success(grant.project))
}

/// PUT /projects/:project_id
pub async fn put(
    State(state): State<AppState>,
    ctx: AuthorizationContext,
    payload: Result<Json<ProjectPayload>, JsonRejection>,
) -> ApiResult<Project> {
    update(state, ctx, payload, UpdateMode::Replace).await
}

/// PATCH /projects/:project_id
pub async fn patch(
    State(state): State<AppState>,
    ctx: AuthorizationContext,
    payload: Result<Json<ProjectPayload>, JsonRejection>,
) -> ApiResult<Project> {
    update(state, ctx, payload, UpdateMode::Merge).await
}

async fn update(
    state: AppState,
    ctx: AuthorizationContext,
    payload: Result<Json<ProjectPayload>, JsonRejection>,
    mode: UpdateMode,
) -> ApiResult<Project> {
    let grant = state.authorizer().project(&ctx).await?;
    let Json(payload) = payload?;

    let project = payload.apply(grant.project, mode)?;
    let project = state.store.update_project(&project).await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /projects/:project_id - cascades to members, issues and comments
pub async fn delete(State(state): State<AppState>, ctx: AuthorizationContext) -> ApiResult<()> {
    let grant = state.authorizer().project(&ctx).await?;
    state.store.delete_project(grant.project.id).await?;

    tracing::info!("User {} deleted project {}", grant.principal, grant.project.id);
    Ok(ApiResponse::no_content())
}
