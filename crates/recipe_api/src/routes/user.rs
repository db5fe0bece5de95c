//! Account routes: sign-up, token issue and the caller's own profile.

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::serializers::{AuthTokenRequest, AuthTokenResponse, UserRequest, UserResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use recipe_core::{SqliteUserRepository, UserService};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create/", post(create_user))
        .route("/token/", post(create_token))
        .route(
            "/me/",
            get(get_me).put(put_me).patch(patch_me),
        )
}

async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(payload) = payload?;
    let (email, password, name) = payload.into_new_user()?;
    let user = state
        .with_db(move |conn| {
            let service = UserService::new(SqliteUserRepository::try_new(conn)?);
            Ok(service.create_user(&email, &password, &name)?)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

async fn create_token(
    State(state): State<AppState>,
    payload: Result<Json<AuthTokenRequest>, JsonRejection>,
) -> Result<Json<AuthTokenResponse>, ApiError> {
    let Json(payload) = payload?;
    let token = state
        .with_db(move |conn| {
            let service = UserService::new(SqliteUserRepository::try_new(conn)?);
            Ok(service.issue_token(&payload.email, &payload.password)?)
        })
        .await?;
    Ok(Json(AuthTokenResponse { token }))
}

async fn get_me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

async fn put_me(
    state: State<AppState>,
    caller: AuthUser,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    update_me(state, caller, payload, false).await
}

async fn patch_me(
    state: State<AppState>,
    caller: AuthUser,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    update_me(state, caller, payload, true).await
}

async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<UserRequest>, JsonRejection>,
    partial: bool,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(payload) = payload?;
    let changes = payload.into_changes(partial)?;
    let updated = state
        .with_db(move |conn| {
            let service = UserService::new(SqliteUserRepository::try_new(conn)?);
            Ok(service.update_user(user.id, &changes)?)
        })
        .await?;
    Ok(Json(UserResponse::from(&updated)))
}
