use axum::{
    extract::State,
    http::HeaderValue,
    middleware,
    response::Json,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full router over `state`. Used by `main` and by the integration tests.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(user_routes())
        .merge(auth_routes(&state))
        .merge(profile_routes(&state))
        .merge(post_routes(&state))
        .layer(TraceLayer::new_for_http());

    let router = if state.config.security.enable_cors {
        router.layer(cors_layer(&state.config.security))
    } else {
        router
    };

    router.with_state(state)
}

/// Put `route` behind the token guard
fn guarded(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(
        state.clone(),
        jwt_auth_middleware,
    ))
}

fn user_routes() -> Router<AppState> {
    Router::new().route("/api/users", post(public::users::register))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/api/auth",
        post(public::auth::login).merge(guarded(state, get(protected::auth::current_user))),
    )
}

fn profile_routes(state: &AppState) -> Router<AppState> {
    use protected::profile as own;
    use public::profile;

    Router::new()
        .route(
            "/api/profile",
            get(profile::list).merge(guarded(
                state,
                post(own::upsert).delete(own::delete_account),
            )),
        )
        .route("/api/profile/user/:user_id", get(profile::by_user))
        .route("/api/profile/github/:username", get(profile::github_repos))
        .route("/api/profile/me", guarded(state, get(own::me)))
        .route(
            "/api/profile/experience",
            guarded(state, put(own::add_experience)),
        )
        // PUT kept alongside DELETE for older clients
        .route(
            "/api/profile/experience/:exp_id",
            guarded(
                state,
                delete(own::remove_experience).put(own::remove_experience),
            ),
        )
        .route(
            "/api/profile/education",
            guarded(state, put(own::add_education)),
        )
        .route(
            "/api/profile/education/:edu_id",
            guarded(
                state,
                delete(own::remove_education).put(own::remove_education),
            ),
        )
}

fn post_routes(state: &AppState) -> Router<AppState> {
    use protected::posts;

    Router::new()
        .route(
            "/api/posts",
            guarded(state, get(posts::list).post(posts::create)),
        )
        .route(
            "/api/posts/:id",
            guarded(state, get(posts::get).delete(posts::delete)),
        )
        .route("/api/posts/like/:id", guarded(state, put(posts::like)))
        .route("/api/posts/unlike/:id", guarded(state, put(posts::unlike)))
        .route("/api/posts/comment/:id", guarded(state, put(posts::comment)))
        .route(
            "/api/posts/comment/:id/:comment_id",
            guarded(state, delete(posts::delete_comment)),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.store.ping().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        ApiError::service_unavailable("Store unavailable")
    })?;

    Ok(Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    })))
}
