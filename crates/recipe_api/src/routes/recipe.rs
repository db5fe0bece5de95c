//! Recipe routes.
//!
//! # Invariants
//! - Every handler runs as the authenticated caller and only sees their rows.
//! - Lists use the short body; single-recipe responses use the detail body.

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::read_upload;
use crate::serializers::{
    parse_id_list, RecipeDetailResponse, RecipeImageResponse, RecipeRequest, RecipeResponse,
};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use recipe_core::{RecipeId, RecipeListQuery, RecipeService, SqliteRecipeRepository};
use serde::Deserialize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipes/", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id/",
            get(get_recipe)
                .put(put_recipe)
                .patch(patch_recipe)
                .delete(delete_recipe),
        )
        .route("/recipes/:id/upload-image/", post(upload_image))
}

/// `?tags=1,2&ingredients=3`
#[derive(Debug, Default, Deserialize)]
pub struct RecipeFilter {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    filter: Result<Query<RecipeFilter>, QueryRejection>,
) -> Result<Json<Vec<RecipeResponse>>, ApiError> {
    let Query(filter) = filter?;
    let mut query = RecipeListQuery::for_user(user.id);
    if let Some(raw) = filter.tags.as_deref() {
        query.tag_ids = parse_id_list("tags", raw)?;
    }
    if let Some(raw) = filter.ingredients.as_deref() {
        query.ingredient_ids = parse_id_list("ingredients", raw)?;
    }

    let recipes = state
        .with_db(move |conn| {
            let service = RecipeService::new(SqliteRecipeRepository::try_new(conn)?);
            Ok(service.list_recipes(&query)?)
        })
        .await?;
    Ok(Json(recipes.iter().map(RecipeResponse::from).collect()))
}

async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecipeDetailResponse>), ApiError> {
    let Json(payload) = payload?;
    let draft = payload.into_draft()?;
    let recipe = state
        .with_db(move |conn| {
            let mut service = RecipeService::new(SqliteRecipeRepository::try_new(conn)?);
            Ok(service.create_recipe(user.id, &draft)?)
        })
        .await?;
    let body = RecipeDetailResponse::new(&recipe, |path| state.url_for(path));
    Ok((StatusCode::CREATED, Json(body)))
}

async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    id: Result<Path<RecipeId>, PathRejection>,
) -> Result<Json<RecipeDetailResponse>, ApiError> {
    let Path(id) = id?;
    let recipe = state
        .with_db(move |conn| {
            let service = RecipeService::new(SqliteRecipeRepository::try_new(conn)?);
            Ok(service.get_recipe(user.id, id)?)
        })
        .await?;
    Ok(Json(RecipeDetailResponse::new(&recipe, |path| {
        state.url_for(path)
    })))
}

async fn put_recipe(
    state: State<AppState>,
    caller: AuthUser,
    id: Result<Path<RecipeId>, PathRejection>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> Result<Json<RecipeDetailResponse>, ApiError> {
    update_recipe(state, caller, id, payload, false).await
}

async fn patch_recipe(
    state: State<AppState>,
    caller: AuthUser,
    id: Result<Path<RecipeId>, PathRejection>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> Result<Json<RecipeDetailResponse>, ApiError> {
    update_recipe(state, caller, id, payload, true).await
}

async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    id: Result<Path<RecipeId>, PathRejection>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
    partial: bool,
) -> Result<Json<RecipeDetailResponse>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let changes = payload.into_changes(partial)?;
    let recipe = state
        .with_db(move |conn| {
            let mut service = RecipeService::new(SqliteRecipeRepository::try_new(conn)?);
            Ok(service.update_recipe(user.id, id, &changes)?)
        })
        .await?;
    Ok(Json(RecipeDetailResponse::new(&recipe, |path| {
        state.url_for(path)
    })))
}

async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    id: Result<Path<RecipeId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let media = state.media.clone();
    state
        .with_db(move |conn| {
            let service = RecipeService::new(SqliteRecipeRepository::try_new(conn)?);
            Ok(service.delete_recipe(user.id, id, &media)?)
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    id: Result<Path<RecipeId>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RecipeImageResponse>, ApiError> {
    let Path(id) = id?;
    let upload = read_upload(multipart?, "image").await?;
    let media = state.media.clone();
    let recipe = state
        .with_db(move |conn| {
            let service = RecipeService::new(SqliteRecipeRepository::try_new(conn)?);
            Ok(service.upload_image(user.id, id, &media, &upload.filename, &upload.bytes)?)
        })
        .await?;
    Ok(Json(RecipeImageResponse::new(&recipe, |path| {
        state.url_for(path)
    })))
}
