use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use tower::Layer;
use tower_http::{
    cors::{Any, CorsLayer},
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::TraceLayer,
};

use crate::config::{config, PermissionsConfig};
use crate::database::EntityStore;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::permissions::Authorizer;

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub permissions: PermissionsConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, permissions: PermissionsConfig) -> Self {
        Self { store, permissions }
    }

    pub fn authorizer(&self) -> Authorizer<'_> {
        Authorizer::new(self.store.as_ref(), self.permissions.issue_edit_policy)
    }
}

/// Full application: public and protected routes with the global layers.
///
/// Trailing slashes are trimmed before routing so `/projects/1/` and
/// `/projects/1` reach the same handler.
pub fn app(state: AppState) -> NormalizePath<Router> {
    let settings = config();

    let mut router = Router::new()
        .merge(public_routes())
        .merge(protected_routes())
        .layer(DefaultBodyLimit::max(settings.api.max_request_size_bytes));

    if settings.security.enable_cors {
        router = router.layer(cors_layer(&settings.security.cors_origins));
    }
    if settings.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    NormalizePathLayer::trim_trailing_slash().layer(router.with_state(state))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .merge(project_routes())
        .merge(contributor_routes())
        .merge(issue_routes())
        .merge(comment_routes())
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn project_routes() -> Router<AppState> {
    use protected::projects;

    Router::new()
        .route("/projects", get(projects::list).post(projects::create))
        .route(
            "/projects/:project_id",
            get(projects::get)
                .put(projects::put)
                .patch(projects::patch)
                .delete(projects::delete),
        )
}

fn contributor_routes() -> Router<AppState> {
    use protected::contributors;

    Router::new()
        .route(
            "/projects/:project_id/users",
            get(contributors::list).post(contributors::create),
        )
        .route(
            "/projects/:project_id/users/:user_id",
            delete(contributors::delete),
        )
}

fn issue_routes() -> Router<AppState> {
    use protected::issues;

    Router::new()
        .route(
            "/projects/:project_id/issues",
            get(issues::list).post(issues::create),
        )
        .route(
            "/projects/:project_id/issues/:issue_id",
            get(issues::get)
                .put(issues::put)
                .patch(issues::patch)
                .delete(issues::delete),
        )
}

fn comment_routes() -> Router<AppState> {
    use protected::comments;

    Router::new()
        .route(
            "/projects/:project_id/issues/:issue_id/comments",
            get(comments::list).post(comments::create),
        )
        .route(
            "/projects/:project_id/issues/:issue_id/comments/:comment_id",
            get(comments::get)
                .put(comments::put)
                .patch(comments::patch)
                .delete(comments::delete),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}
