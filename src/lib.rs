use axum::{
    Router,
    extract::FromRef,
    http::{HeaderName, StatusCode},
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod authz;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod services;

// Routing grouped by access gate (public, authenticated, authoring).
pub mod routes;
use routes::{authenticated, authoring, public};

// --- Public Re-exports ---

pub use auth::{AuthUser, TokenKeys};
pub use config::AppConfig;
pub use error::{AppError, StoreError};
pub use repository::{PostgresRepository, Repository, RepositoryState};
use services::{CommentService, LikeService, PostService, UserService};

/// ApiDoc
///
/// OpenAPI document aggregated from the `#[utoipa::path]` handlers and `ToSchema`
/// models, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register, handlers::login, handlers::get_me,
        handlers::list_posts, handlers::get_post, handlers::get_post_with_comments,
        handlers::create_post, handlers::update_post, handlers::delete_post,
        handlers::like_post, handlers::unlike_post, handlers::get_post_likes,
        handlers::get_my_likes, handlers::add_comment, handlers::get_comments,
        handlers::update_comment, handlers::delete_comment, handlers::get_my_comments
    ),
    components(
        schemas(
            models::Role, models::Post, models::Comment, models::Like, models::LikeWithUser,
            models::RegisterRequest, models::RegisterResponse, models::LoginRequest,
            models::LoginResponse, models::PostInput, models::CommentInput,
            models::MessageResponse, models::UserProfile, models::PostLikes,
            models::PostWithComments,
        )
    ),
    tags(
        (name = "blog-api", description = "Posts, comments and likes with role-based accounts")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single immutable container shared by every request: configuration, token keys,
/// the store handle, and the services built on top of it.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub config: AppConfig,
    pub tokens: TokenKeys,
    pub users: UserService,
    pub posts: PostService,
    pub comments: CommentService,
    pub likes: LikeService,
}

impl AppState {
    /// Wires every service to the same injected store.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        let tokens = TokenKeys::from_config(&config);
        Self {
            users: UserService::new(repo.clone(), tokens.clone()),
            posts: PostService::new(repo.clone()),
            comments: CommentService::new(repo.clone()),
            likes: LikeService::new(repo.clone()),
            repo,
            config,
            tokens,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(app_state: &AppState) -> TokenKeys {
        app_state.tokens.clone()
    }
}

/// create_router
///
/// Assembles the routing table, attaches each group's access gate, and wraps the whole
/// router in the observability and deadline layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");
    let timeout = state.config.request_timeout();

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), authz::require_auth)),
        )
        .merge(
            authoring::blogger_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), authz::require_blogger)),
        )
        .merge(
            authoring::owner_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                authz::require_post_owner,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id))
                // Dropping the request future on timeout also cancels its store calls.
                .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying method, URI and the `x-request-id` so every log line
/// of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
