//! # Authentication
//!
//! Password hashing for guests and admins, and signed bearer tokens for
//! admin-only endpoints.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::error::{ApiError, forbidden, unauthorized};
use crate::models::admin::{AdminRole, Model as AdminModel};
use crate::server::AppState;

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("failed to sign token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("password worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        anyhow::Error::new(error).into()
    }
}

/// Hashes a password into an Argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC string. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// [`hash_password`] on the blocking pool, off the request workers.
pub async fn hash_password_async(password: &str) -> Result<String, AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// [`verify_password`] on the blocking pool, off the request workers.
pub async fn verify_password_async(password: &str, hash: &str) -> Result<bool, AuthError> {
    let (password, hash) = (password.to_owned(), hash.to_owned());
    Ok(tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?)
}

/// Claims carried by admin tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Admin id
    pub sub: i32,
    pub role: AdminRole,
    pub exp: usize,
    pub iat: usize,
}

/// Signs a token for `admin` valid for the configured lifetime.
pub fn issue_admin_token(config: &AppConfig, admin: &AdminModel) -> Result<String, AuthError> {
    let now = chrono::Utc::now();
    let lifetime = chrono::Duration::seconds(config.jwt_expiry_seconds as i64);
    let claims = AdminClaims {
        sub: admin.id,
        role: admin.role,
        exp: (now + lifetime).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_signing_secret().as_bytes()),
    )?)
}

pub fn decode_admin_token(config: &AppConfig, token: &str) -> Result<AdminClaims, ApiError> {
    jsonwebtoken::decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(config.jwt_signing_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Admin token rejected: {e}");
        unauthorized(Some("Invalid or expired token"))
    })
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized(Some("Missing Authorization header")))?
        .to_str()
        .map_err(|_| unauthorized(Some("Invalid Authorization header")))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized(Some("Authorization header must use Bearer scheme")))
}

/// Extractor for an authenticated admin. Rejects with 401 when the bearer
/// token is missing or invalid.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub AdminClaims);

impl AdminAuth {
    pub fn admin_id(&self) -> i32 {
        self.0.sub
    }

    /// Requires the superadmin role.
    pub fn require_superadmin(&self) -> Result<(), ApiError> {
        if self.0.role == AdminRole::SuperAdmin {
            Ok(())
        } else {
            Err(forbidden(Some("Superadmin role required")))
        }
    }
}

impl AdminAuth {
    /// Authenticates from raw headers, for handlers where a token is only
    /// sometimes required.
    pub fn from_headers(config: &AppConfig, headers: &HeaderMap) -> Result<Self, ApiError> {
        let token = extract_bearer_token(headers)?;
        let claims = decode_admin_token(config, token)?;
        tracing::debug!(admin_id = claims.sub, role = claims.role.as_str(), "Authenticated admin request");
        Ok(AdminAuth(claims))
    }

    /// Admins may act on their own account; superadmins on any.
    pub fn require_self_or_superadmin(&self, admin_id: i32) -> Result<(), ApiError> {
        if self.0.sub == admin_id {
            Ok(())
        } else {
            self.require_superadmin()
        }
    }
}

impl<S> FromRequestParts<S> for AdminAuth
where
    Arc<AppConfig>: FromRef<S>,
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<AppConfig>::from_ref(state);
        AdminAuth::from_headers(&config, &parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;

    fn admin(role: AdminRole) -> AdminModel {
        AdminModel {
            id: 7,
            username: "frontdesk".to_string(),
            email: "frontdesk@example.com".to_string(),
            password_hash: String::new(),
            role,
            avatar_url: None,
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn blocking_pool_password_helpers_round_trip() {
        let hash = hash_password_async("correct horse").await.unwrap();
        assert!(verify_password_async("correct horse", &hash).await.unwrap());
        assert!(!verify_password_async("wrong horse", &hash).await.unwrap());
        assert!(!verify_password_async("correct horse", "not-a-phc").await.unwrap());
    }

    #[test]
    fn issued_token_decodes_with_same_secret() {
        let config = AppConfig::default();
        let token = issue_admin_token(&config, &admin(AdminRole::Manager)).unwrap();
        let claims = decode_admin_token(&config, &token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, AdminRole::Manager);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let signer = AppConfig {
            jwt_secret: Some("a".repeat(40)),
            ..AppConfig::default()
        };
        let verifier = AppConfig {
            jwt_secret: Some("b".repeat(40)),
            ..AppConfig::default()
        };
        let token = issue_admin_token(&signer, &admin(AdminRole::Admin)).unwrap();
        let err = decode_admin_token(&verifier, &token).unwrap_err();
        assert_eq!(err.code.as_ref(), "UNAUTHORIZED");
    }

    #[test]
    fn bearer_scheme_is_required() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn superadmin_gate() {
        let claims = |role| AdminClaims {
            sub: 1,
            role,
            exp: 0,
            iat: 0,
        };
        assert!(AdminAuth(claims(AdminRole::SuperAdmin)).require_superadmin().is_ok());
        assert!(AdminAuth(claims(AdminRole::Admin)).require_superadmin().is_err());

        assert!(AdminAuth(claims(AdminRole::Admin)).require_self_or_superadmin(1).is_ok());
        assert!(AdminAuth(claims(AdminRole::Admin)).require_self_or_superadmin(2).is_err());
        assert!(AdminAuth(claims(AdminRole::SuperAdmin)).require_self_or_superadmin(2).is_ok());
    }
}
