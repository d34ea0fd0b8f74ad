use crate::error::ApiError;
use crate::state::AppState;
use crate::utils::password::verify_password_blocking;
use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

/// An account whose Basic credentials were checked on this very request.
///
/// There are no sessions: every request to a protected route carries
/// `Authorization: Basic ...` and the password is verified against the stored
/// hash each time. Anything missing or wrong is a 401 with a realm challenge.
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // 1. Pull the Basic credentials out of the header.
        let TypedHeader(Authorization(basic)) = parts
            .extract::<TypedHeader<Authorization<Basic>>>()
            .await
            .map_err(|_| ApiError::Unauthorized)?;

        if basic.username().is_empty() || basic.password().is_empty() {
            return Err(ApiError::Unauthorized);
        }

        // 2. Look up the account and check the password. A missing account still
        // pays for a verification so the two failures look the same.
        let account = state.accounts.find_by_username(basic.username()).await?;
        let stored_hash = account.as_ref().map(|a| a.password_hash.clone());

        if !verify_password_blocking(basic.password().to_string(), stored_hash).await? {
            tracing::debug!(username = basic.username(), "basic auth rejected");
            return Err(ApiError::Unauthorized);
        }

        // verify_password_blocking only returns true when the account exists.
        let account = account.ok_or(ApiError::Unauthorized)?;

        Ok(AuthenticatedUser {
            id: account.id,
            username: account.username,
        })
    }
}
