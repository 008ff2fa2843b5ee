use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    models::{AdminAccount, AdminProfile},
    repository::{Repository, RepositoryState},
};

/// Cookie carrying the Google sign-in session.
pub const SESSION_COOKIE: &str = "club_session";
/// Cookie carrying the token issued by the password login.
pub const LEGACY_COOKIE: &str = "token";
/// Short-lived cookie binding an OAuth redirect to the browser that started it.
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
/// Development-only header naming the admin to act as. Ignored in production.
pub const DEV_ADMIN_HEADER: &str = "x-admin-email";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// SessionClaims
///
/// Payload of the `club_session` cookie. The subject is the Google account email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub sub: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// LegacyClaims
///
/// Payload of the `token` cookie. The subject is the `_id` of an `AdminAccount`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacyClaims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Which of the lookup steps produced the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    Google,
    Credentials,
    DevHeader,
}

impl AuthSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthSource::Google => "google",
            AuthSource::Credentials => "credentials",
            AuthSource::DevHeader => "local",
        }
    }
}

/// AdminUser
///
/// The resolved identity of an administrator. Produced by `resolve_admin`, it is
/// the only thing the admin handlers know about who is calling.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminUser {
    // Set when the identity is backed by an `AdminAccount` document.
    pub id: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub source: AuthSource,
}

impl AdminUser {
    pub fn profile(&self) -> AdminProfile {
        AdminProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            image: self.image.clone(),
            provider: self.source.as_str().to_string(),
        }
    }
}

// --- Tokens ---

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation
}

pub fn issue_session_token(
    config: &AppConfig,
    email: &str,
    name: Option<String>,
    picture: Option<String>,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: email.trim().to_lowercase(),
        name,
        picture,
        iat: now.timestamp(),
        exp: (now + Duration::hours(config.session_ttl_hours)).timestamp(),
    };
    let key = EncodingKey::from_secret(config.session_secret.as_bytes());
    Ok(encode(&Header::new(Algorithm::HS256), &claims, &key)?)
}

pub fn decode_session_token(token: &str, secret: &str) -> Result<SessionClaims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    Ok(decode::<SessionClaims>(token, &key, &validation())?.claims)
}

pub fn issue_legacy_token(config: &AppConfig, admin: &AdminAccount) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = LegacyClaims {
        sub: admin.id.clone(),
        email: admin.email.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(config.legacy_token_ttl_hours)).timestamp(),
    };
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    Ok(encode(&Header::new(Algorithm::HS256), &claims, &key)?)
}

pub fn decode_legacy_token(token: &str, secret: &str) -> Result<LegacyClaims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    Ok(decode::<LegacyClaims>(token, &key, &validation())?.claims)
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(bcrypt::verify(password, hash)?)
}

// --- Cookies ---

/// Builds an HttpOnly, `SameSite=Lax` cookie scoped to the whole site. `Secure`
/// is set outside local development.
pub fn auth_cookie(
    name: &'static str,
    value: String,
    max_age: time::Duration,
    config: &AppConfig,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure())
        .path("/")
        .max_age(max_age)
        .build()
}

pub fn session_cookie(token: String, config: &AppConfig) -> Cookie<'static> {
    let max_age = time::Duration::hours(config.session_ttl_hours);
    auth_cookie(SESSION_COOKIE, token, max_age, config)
}

pub fn legacy_cookie(token: String, config: &AppConfig) -> Cookie<'static> {
    let max_age = time::Duration::hours(config.legacy_token_ttl_hours);
    auth_cookie(LEGACY_COOKIE, token, max_age, config)
}

/// A cookie that, once set, makes the browser drop `name` immediately.
pub fn expired_cookie(name: &'static str, config: &AppConfig) -> Cookie<'static> {
    auth_cookie(name, String::new(), time::Duration::ZERO, config)
}

// --- Identity Resolution ---

/// True when `email` is in the `ADMIN_EMAILS` allowlist or owns an admin account.
pub async fn is_authorized_email(email: &str, repo: &dyn Repository, config: &AppConfig) -> bool {
    if config.is_admin_email(email) {
        return true;
    }
    match repo.find_admin_by_email(email).await {
        Ok(account) => account.is_some(),
        Err(e) => {
            tracing::warn!(error = %e, "admin lookup failed; treating email as unauthorized");
            false
        }
    }
}

/// resolve_admin
///
/// Sequential identity lookup shared by the admin API guard, `GET /api/auth/me`
/// and the page gate:
/// 1. `x-admin-email` header, only in `Env::Local`, for an authorized email.
/// 2. `club_session` cookie whose email is still authorized.
/// 3. `token` cookie whose admin account still exists.
///
/// Each step that fails falls through to the next. Returns `None` when no step
/// yields an identity.
pub async fn resolve_admin(
    headers: &HeaderMap,
    repo: &dyn Repository,
    config: &AppConfig,
) -> Option<AdminUser> {
    if config.env == Env::Local {
        if let Some(email) = headers.get(DEV_ADMIN_HEADER).and_then(|v| v.to_str().ok()) {
            if is_authorized_email(email, repo, config).await {
                let account = repo.find_admin_by_email(email).await.ok().flatten();
                return Some(AdminUser {
                    id: account.as_ref().map(|a| a.id.clone()),
                    email: email.trim().to_lowercase(),
                    name: account.and_then(|a| a.name),
                    image: None,
                    source: AuthSource::DevHeader,
                });
            }
            tracing::debug!(%email, "dev header names an unauthorized email");
        }
    }

    let jar = CookieJar::from_headers(headers);

    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        match decode_session_token(cookie.value(), &config.session_secret) {
            Ok(claims) => {
                if is_authorized_email(&claims.sub, repo, config).await {
                    return Some(AdminUser {
                        id: None,
                        email: claims.sub,
                        name: claims.name,
                        image: claims.picture,
                        source: AuthSource::Google,
                    });
                }
                tracing::debug!(email = %claims.sub, "session email no longer authorized");
            }
            Err(e) => log_rejected_token("session", &e),
        }
    }

    if let Some(cookie) = jar.get(LEGACY_COOKIE) {
        match decode_legacy_token(cookie.value(), &config.jwt_secret) {
            Ok(claims) => match repo.get_admin(&claims.sub).await {
                Ok(Some(admin)) => {
                    return Some(AdminUser {
                        id: Some(admin.id),
                        email: admin.email,
                        name: admin.name,
                        image: None,
                        source: AuthSource::Credentials,
                    });
                }
                Ok(None) => tracing::debug!(admin_id = %claims.sub, "legacy token for deleted admin"),
                Err(e) => tracing::warn!(error = %e, "admin lookup failed during token check"),
            },
            Err(e) => log_rejected_token("legacy", &e),
        }
    }

    None
}

fn log_rejected_token(kind: &str, error: &AuthError) {
    match error {
        AuthError::Token(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
            tracing::debug!(kind, "expired token")
        }
        _ => tracing::debug!(kind, error = %error, "token rejected"),
    }
}

/// AdminUser Extractor
///
/// Resolves the caller through `resolve_admin`. When the `require_admin` layer
/// already resolved the identity, it is taken from the request extensions instead
/// of repeating the lookup.
///
/// Rejection: `ApiError::Unauthorized` (401).
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AdminUser>() {
            return Ok(user.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        resolve_admin(&parts.headers, repo.as_ref(), &config)
            .await
            .ok_or(ApiError::Unauthorized)
    }
}
