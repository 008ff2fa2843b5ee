#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue, header};
use chrono::Utc;
use club_site::{
    AppConfig, AppState, InMemoryRepository, MockImageStore, RateLimiter,
    auth::{self, LEGACY_COOKIE, SESSION_COOKIE},
    models::{AdminAccount, new_id},
    oauth::{GoogleProfile, OAuthError, OAuthProvider},
    repository::Repository,
};
use std::{sync::Arc, time::Duration};

pub const ADMIN_EMAIL: &str = "admin@club.test";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// StubOAuth
///
/// Stands in for Google. `profile: None` makes every code exchange fail.
pub struct StubOAuth {
    pub profile: Option<GoogleProfile>,
}

#[async_trait]
impl OAuthProvider for StubOAuth {
    fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        Ok(format!("https://accounts.test/auth?state={state}"))
    }

    async fn exchange_code(&self, _code: &str) -> Result<GoogleProfile, OAuthError> {
        self.profile.clone().ok_or(OAuthError::UnverifiedEmail)
    }
}

pub fn google_profile(email: &str) -> GoogleProfile {
    GoogleProfile {
        email: email.to_string(),
        email_verified: true,
        name: Some("Google User".to_string()),
        picture: None,
    }
}

pub struct TestApp {
    pub state: AppState,
    pub repo: Arc<InMemoryRepository>,
    pub storage: Arc<MockImageStore>,
}

pub fn test_app() -> TestApp {
    test_app_with(AppConfig::default(), MockImageStore::new(), None)
}

pub fn test_app_with(
    config: AppConfig,
    storage: MockImageStore,
    profile: Option<GoogleProfile>,
) -> TestApp {
    let repo = Arc::new(InMemoryRepository::new());
    let storage = Arc::new(storage);
    let state = AppState {
        repo: repo.clone(),
        storage: storage.clone(),
        oauth: Arc::new(StubOAuth { profile }),
        rate_limiter: Arc::new(RateLimiter::new(
            config.contact_rate_limit_max,
            Duration::from_secs(config.contact_rate_limit_window_secs),
        )),
        config,
    };
    TestApp { state, repo, storage }
}

/// Inserts a password admin. bcrypt runs at minimum cost to keep tests fast.
pub async fn seed_admin(repo: &InMemoryRepository, email: &str) -> AdminAccount {
    let admin = AdminAccount {
        id: new_id(),
        email: email.to_string(),
        name: Some("Seeded Admin".to_string()),
        password_hash: bcrypt::hash(ADMIN_PASSWORD, 4).unwrap(),
        created_at: Utc::now(),
    };
    repo.create_admin(admin).await.unwrap()
}

pub fn cookie_headers(name: &str, value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("{name}={value}")).unwrap(),
    );
    headers
}

pub fn session_cookie_for(config: &AppConfig, email: &str) -> String {
    let token = auth::issue_session_token(config, email, None, None).unwrap();
    format!("{SESSION_COOKIE}={token}")
}

pub fn legacy_cookie_for(config: &AppConfig, admin: &AdminAccount) -> String {
    let token = auth::issue_legacy_token(config, admin).unwrap();
    format!("{LEGACY_COOKIE}={token}")
}
