//! Basic-auth based authentication extractor plus password helpers.
use axum::{
    Extension,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::future::Future;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand_core::OsRng;

use crate::SharedState;
use crate::db::user_repo::{self, User};
use crate::error::AppError;

/// Axum extractor that verifies Basic credentials against the user table.
pub struct Authenticated(pub User);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> {
        Box::pin(async move {
            let Extension(app_state): Extension<SharedState> =
                Extension::from_request_parts(parts, state)
                    .await
                    .map_err(|_| AppError::Internal(anyhow::anyhow!("application state missing")))?;

            let (username, password) = basic_credentials(parts)?;

            let user = user_repo::find_by_username(&app_state.db, &username)
                .await?
                .ok_or(AppError::Unauthorized)?;

            if !verify_password(&user.password_hash, &password)? {
                tracing::info!(user = %username, "login rejected: wrong password");
                return Err(AppError::Unauthorized);
            }
            if !user.active {
                tracing::info!(user = %username, "login rejected: account disabled");
                return Err(AppError::Unauthorized);
            }

            if let Err(err) = user_repo::update_last_login(&app_state.db, user.id).await {
                tracing::warn!(user = %username, error = %err, "could not record login time");
            }
            Ok(Authenticated(user))
        })
    }
}

/// Decode the `Authorization: Basic` header into username and password.
fn basic_credentials(parts: &Parts) -> Result<(String, String), AppError> {
    let header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::bad_request("invalid Authorization header"))?;

    let b64 = header.strip_prefix("Basic ").ok_or(AppError::Unauthorized)?;
    let decoded = BASE64
        .decode(b64.trim())
        .map_err(|_| AppError::bad_request("invalid Base64"))?;
    let decoded =
        String::from_utf8(decoded).map_err(|_| AppError::bad_request("invalid UTF-8"))?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| AppError::bad_request("invalid Basic payload"))?;
    Ok((username.to_string(), password.to_string()))
}

/// Hash a plaintext password using Argon2 + random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|_| anyhow::anyhow!("Failed to hash password"))?
        .to_string();
    Ok(hash)
}

/// Verify a plaintext password against a stored Argon2 hash.
pub fn verify_password(hash: &str, plain: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| anyhow::anyhow!("Failed to instantiate PasswordHash"))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/zones");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("s3cret").unwrap();
        assert!(verify_password(&hash, "s3cret").unwrap());
        assert!(!verify_password(&hash, "wrong").unwrap());
    }

    #[test]
    fn basic_header_parsing() {
        let value = format!("Basic {}", BASE64.encode("admin:pa:ss"));
        let (user, pass) = basic_credentials(&parts_with(Some(&value))).unwrap();
        assert_eq!(user, "admin");
        assert_eq!(pass, "pa:ss");

        assert!(matches!(basic_credentials(&parts_with(None)), Err(AppError::Unauthorized)));
        assert!(matches!(
            basic_credentials(&parts_with(Some("Bearer abc"))),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            basic_credentials(&parts_with(Some("Basic !!!"))),
            Err(AppError::BadRequest(_))
        ));
    }
}
