//! Token authentication extractor.
//!
//! Clients send `Authorization: Token <key>`; the key resolves to an active
//! user or the request is rejected with `401`.

use crate::error::ApiError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use log::debug;
use recipe_core::{SqliteUserRepository, User, UserService};

const TOKEN_SCHEME: &str = "Token";

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(ApiError::NotAuthenticated)?;
        let token = parse_token(header.to_str().map_err(|_| ApiError::InvalidToken)?)?;

        let user = state
            .with_db(move |conn| {
                let service = UserService::new(SqliteUserRepository::try_new(conn)?);
                Ok(service.user_for_token(&token)?)
            })
            .await?;

        match user {
            Some(user) => Ok(Self(user)),
            None => {
                debug!("event=auth_token module=api status=rejected reason=unknown_token");
                Err(ApiError::InvalidToken)
            }
        }
    }
}

fn parse_token(value: &str) -> Result<String, ApiError> {
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case(TOKEN_SCHEME) => {
            Ok(token.to_string())
        }
        (None, _, _) => Err(ApiError::NotAuthenticated),
        (Some(scheme), None, None) if scheme.eq_ignore_ascii_case(TOKEN_SCHEME) => {
            Err(ApiError::InvalidToken)
        }
        (Some(scheme), _, _) if !scheme.eq_ignore_ascii_case(TOKEN_SCHEME) => {
            Err(ApiError::NotAuthenticated)
        }
        _ => Err(ApiError::InvalidToken),
    }
}
