use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("request to identity provider failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to encode authorization url: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
    #[error("google account email is not verified")]
    UnverifiedEmail,
}

/// GoogleProfile
///
/// The subset of the OpenID Connect userinfo document the site relies on.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GoogleProfile {
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// OAuthProvider
///
/// The two halves of an authorization-code sign-in. Handlers only see this
/// trait, so tests can swap Google for a stub.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// URL of the provider's consent screen, carrying `state` for CSRF protection.
    fn authorize_url(&self, state: &str) -> Result<String, OAuthError>;

    /// Trades the authorization code for an access token and fetches the profile it grants.
    async fn exchange_code(&self, code: &str) -> Result<GoogleProfile, OAuthError>;
}

pub type OAuthState = Arc<dyn OAuthProvider>;

#[derive(Clone)]
pub struct GoogleOAuthClient {
    http_client: Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
}

#[derive(Serialize)]
struct AuthorizeParams<'a> {
    client_id: &'a str,
    redirect_uri: &'a str,
    response_type: &'a str,
    scope: &'a str,
    state: &'a str,
    prompt: &'a str,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    grant_type: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl GoogleOAuthClient {
    pub fn new(config: &AppConfig, timeout: Duration) -> Result<Self, OAuthError> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_url: config.google_redirect_url(),
            auth_url: config.google_auth_url.clone(),
            token_url: config.google_token_url.clone(),
            userinfo_url: config.google_userinfo_url.clone(),
        })
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthClient {
    fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        let query = serde_urlencoded::to_string(AuthorizeParams {
            client_id: &self.client_id,
            redirect_uri: &self.redirect_url,
            response_type: "code",
            scope: "openid email profile",
            state,
            prompt: "select_account",
        })?;
        Ok(format!("{}?{}", self.auth_url, query))
    }

    async fn exchange_code(&self, code: &str) -> Result<GoogleProfile, OAuthError> {
        let token: TokenResponse = self
            .http_client
            .post(&self.token_url)
            .form(&TokenRequest {
                code,
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                redirect_uri: &self.redirect_url,
                grant_type: "authorization_code",
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let profile: GoogleProfile = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !profile.email_verified {
            return Err(OAuthError::UnverifiedEmail);
        }

        Ok(GoogleProfile {
            email: profile.email.trim().to_lowercase(),
            ..profile
        })
    }
}
