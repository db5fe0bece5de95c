//! Tag and ingredient routes.
//!
//! Both resources share handlers; the nested router carries its
//! [`AttributeKind`] as a request extension.

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::serializers::{parse_flag, AttributeRequest, AttributeResponse};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use recipe_core::{AttributeId, AttributeKind, AttributeService, SqliteAttributeRepository};
use serde::Deserialize;

/// Routes for one attribute kind, mounted at `/tags/` or `/ingredients/`.
pub fn router(kind: AttributeKind) -> Router<AppState> {
    let base = format!("/{}/", kind.field());
    let item = format!("/{}/:id/", kind.field());
    Router::new()
        .route(&base, get(list_attributes))
        .route(
            &item,
            put(put_attribute)
                .patch(patch_attribute)
                .delete(delete_attribute),
        )
        .layer(Extension(kind))
}

#[derive(Debug, Default, Deserialize)]
pub struct AttributeFilter {
    pub assigned_only: Option<String>,
}

async fn list_attributes(
    State(state): State<AppState>,
    Extension(kind): Extension<AttributeKind>,
    AuthUser(user): AuthUser,
    filter: Result<Query<AttributeFilter>, QueryRejection>,
) -> Result<Json<Vec<AttributeResponse>>, ApiError> {
    let Query(filter) = filter?;
    let assigned_only = match filter.assigned_only.as_deref() {
        Some(raw) => parse_flag("assigned_only", raw)?,
        None => false,
    };
    let items = state
        .with_db(move |conn| {
            let service = AttributeService::new(SqliteAttributeRepository::try_new(conn)?);
            Ok(service.list(kind, user.id, assigned_only)?)
        })
        .await?;
    Ok(Json(items.iter().map(AttributeResponse::from).collect()))
}

async fn put_attribute(
    state: State<AppState>,
    kind: Extension<AttributeKind>,
    caller: AuthUser,
    id: Result<Path<AttributeId>, PathRejection>,
    payload: Result<Json<AttributeRequest>, JsonRejection>,
) -> Result<Json<AttributeResponse>, ApiError> {
    rename_attribute(state, kind, caller, id, payload, false).await
}

async fn patch_attribute(
    state: State<AppState>,
    kind: Extension<AttributeKind>,
    caller: AuthUser,
    id: Result<Path<AttributeId>, PathRejection>,
    payload: Result<Json<AttributeRequest>, JsonRejection>,
) -> Result<Json<AttributeResponse>, ApiError> {
    rename_attribute(state, kind, caller, id, payload, true).await
}

async fn rename_attribute(
    State(state): State<AppState>,
    Extension(kind): Extension<AttributeKind>,
    AuthUser(user): AuthUser,
    id: Result<Path<AttributeId>, PathRejection>,
    payload: Result<Json<AttributeRequest>, JsonRejection>,
    partial: bool,
) -> Result<Json<AttributeResponse>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let name = payload.into_name(partial)?;

    let item = state
        .with_db(move |conn| {
            let service = AttributeService::new(SqliteAttributeRepository::try_new(conn)?);
            match name {
                Some(name) => Ok(service.rename(kind, user.id, id, &name)?),
                None => Ok(service.get(kind, user.id, id)?),
            }
        })
        .await?;
    Ok(Json(AttributeResponse::from(&item)))
}

async fn delete_attribute(
    State(state): State<AppState>,
    Extension(kind): Extension<AttributeKind>,
    AuthUser(user): AuthUser,
    id: Result<Path<AttributeId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state
        .with_db(move |conn| {
            let service = AttributeService::new(SqliteAttributeRepository::try_new(conn)?);
            Ok(service.delete(kind, user.id, id)?)
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
