use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    models::{
        Comment, CommentInput, Like, LoginRequest, LoginResponse, MessageResponse, Post,
        PostInput, PostLikes, PostWithComments, RegisterRequest, RegisterResponse, UserProfile,
    },
};
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, State},
    http::StatusCode,
};

/// ValidatedJson
///
/// `Json` whose rejection (malformed body, unknown `account_type`, missing field) is
/// reported as a 400 `AppError::Validation` instead of axum's default 422.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidatedJson<T>(pub T);

/// ValidatedPath
///
/// `Path` whose rejection (e.g. a non-numeric id) is a 400 `AppError::Validation` with
/// the usual JSON error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ValidatedPath<T>(pub T);

// --- Accounts ---

/// register
///
/// [Public Route] Creates a blogger or viewer account.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = RegisterResponse),
        (status = 400, description = "Invalid payload or username exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let user = state.users.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "user created".to_string(),
            user: user.username,
            account_type: user.account_type,
        }),
    ))
}

/// login
///
/// [Public Route] Exchanges credentials for a session token.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let token = state.users.login(&payload.username, &payload.password).await?;
    Ok(Json(LoginResponse { token }))
}

/// get_me
///
/// [Authenticated Route] The principal encoded in the caller's token.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(user: AuthUser) -> Json<UserProfile> {
    Json(UserProfile {
        id: user.id,
        username: user.username,
        account_type: user.role,
    })
}

// --- Posts ---

#[utoipa::path(
    get,
    path = "/api/posts",
    responses((status = 200, description = "All posts", body = [Post]))
)]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, AppError> {
    Ok(Json(state.posts.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<Post>, AppError> {
    Ok(Json(state.posts.get(id).await?))
}

/// get_post_with_comments
///
/// [Public Route] A post and its comments in one response.
#[utoipa::path(
    get,
    path = "/api/posts/{id}/full",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = PostWithComments),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_post_with_comments(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<PostWithComments>, AppError> {
    Ok(Json(state.posts.get_with_comments(id).await?))
}

/// create_post
///
/// [Blogger Route] The owner is taken from the token, never from the body.
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = PostInput,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 400, description = "Empty title or content"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not a blogger")
    )
)]
pub async fn create_post(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PostInput>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let post = state.posts.create(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// update_post
///
/// [Owner Route] The ownership gate has already run for this request.
#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = PostInput,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_post(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(payload): ValidatedJson<PostInput>,
) -> Result<Json<Post>, AppError> {
    Ok(Json(state.posts.update(&user, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_post(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    state.posts.delete(&user, id).await?;
    Ok(Json(MessageResponse::new("post deleted")))
}

// --- Likes ---

#[utoipa::path(
    post,
    path = "/api/posts/{id}/like",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 201, description = "Liked", body = Like),
        (status = 403, description = "Own post"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Already liked")
    )
)]
pub async fn like_post(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedPath(post_id): ValidatedPath<i64>,
) -> Result<(StatusCode, Json<Like>), AppError> {
    let like = state.likes.like(&user, post_id).await?;
    Ok((StatusCode::CREATED, Json(like)))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}/like",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Unliked", body = MessageResponse),
        (status = 404, description = "Post or like not found")
    )
)]
pub async fn unlike_post(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedPath(post_id): ValidatedPath<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    state.likes.unlike(&user, post_id).await?;
    Ok(Json(MessageResponse::new("post unliked")))
}

/// get_post_likes
///
/// [Public Route] Like summary; a valid token personalises `is_liked_by_user`.
#[utoipa::path(
    get,
    path = "/api/posts/{id}/likes",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Likes", body = PostLikes),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post_likes(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    ValidatedPath(post_id): ValidatedPath<i64>,
) -> Result<Json<PostLikes>, AppError> {
    Ok(Json(state.likes.likes_for_post(post_id, viewer.as_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/me/likes",
    responses((status = 200, description = "My likes", body = [Like]))
)]
pub async fn get_my_likes(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Like>>, AppError> {
    Ok(Json(state.likes.likes_for_user(&user).await?))
}

// --- Comments ---

#[utoipa::path(
    post,
    path = "/api/posts/{id}/comments",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = CommentInput,
    responses(
        (status = 201, description = "Comment Added", body = Comment),
        (status = 400, description = "Empty comment"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn add_comment(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedPath(post_id): ValidatedPath<i64>,
    ValidatedJson(payload): ValidatedJson<CommentInput>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment = state.comments.create(&user, post_id, payload).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}/comments",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Comments", body = [Comment]),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_comments(
    State(state): State<AppState>,
    ValidatedPath(post_id): ValidatedPath<i64>,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(state.comments.list_for_post(post_id).await?))
}

/// update_comment
///
/// [Authenticated Route] Author-only; the service runs the ownership check.
#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    params(("id" = i64, Path, description = "Comment ID")),
    request_body = CommentInput,
    responses(
        (status = 200, description = "Updated", body = Comment),
        (status = 403, description = "Not Author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_comment(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(payload): ValidatedJson<CommentInput>,
) -> Result<Json<Comment>, AppError> {
    Ok(Json(state.comments.update(&user, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not Author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_comment(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    state.comments.delete(&user, id).await?;
    Ok(Json(MessageResponse::new("comment deleted")))
}

#[utoipa::path(
    get,
    path = "/api/users/me/comments",
    responses((status = 200, description = "My comments", body = [Comment]))
)]
pub async fn get_my_comments(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(state.comments.list_for_user(&user).await?))
}
