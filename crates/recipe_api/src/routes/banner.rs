//! Banner image routes.

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::read_upload;
use crate::serializers::BannerImageResponse;
use crate::state::AppState;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use recipe_core::{BannerService, SqliteBannerRepository};

pub fn router() -> Router<AppState> {
    Router::new().route("/banners/", get(list_banners).post(upload_banner))
}

async fn list_banners(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> Result<Json<Vec<BannerImageResponse>>, ApiError> {
    let banners = state
        .with_db(|conn| {
            let service = BannerService::new(SqliteBannerRepository::try_new(conn)?);
            Ok(service.list()?)
        })
        .await?;
    Ok(Json(
        banners
            .iter()
            .map(|banner| BannerImageResponse::new(banner, |path| state.url_for(path)))
            .collect(),
    ))
}

async fn upload_banner(
    State(state): State<AppState>,
    _caller: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<BannerImageResponse>), ApiError> {
    let upload = read_upload(multipart?, "banner_image").await?;
    let media = state.media.clone();
    let banner = state
        .with_db(move |conn| {
            let service = BannerService::new(SqliteBannerRepository::try_new(conn)?);
            Ok(service.upload(&media, &upload.filename, &upload.bytes)?)
        })
        .await?;
    let body = BannerImageResponse::new(&banner, |path| state.url_for(path));
    Ok((StatusCode::CREATED, Json(body)))
}
