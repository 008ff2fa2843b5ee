use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;
use rand::{Rng, distributions::Alphanumeric, thread_rng};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    AppState,
    auth::{
        self, LEGACY_COOKIE, OAUTH_STATE_COOKIE, SESSION_COOKIE, auth_cookie, expired_cookie,
        is_authorized_email, resolve_admin,
    },
    error::{ApiError, ApiResult},
    models::{AuthStatus, LoginRequest},
    validation::ValidatedJson,
};

const OAUTH_STATE_TTL_MINUTES: i64 = 10;

/// login
///
/// [Auth Route] Password login for admin accounts. Issues the legacy `token`
/// cookie. Unknown email and wrong password are indistinguishable to the caller.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthStatus),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthStatus>)> {
    let Some(admin) = state.repo.find_admin_by_email(&payload.email).await? else {
        tracing::debug!("login attempt for unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !auth::verify_password(&payload.password, &admin.password_hash)? {
        tracing::debug!(admin_id = %admin.id, "login attempt with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = auth::issue_legacy_token(&state.config, &admin)?;
    let jar = jar.add(auth::legacy_cookie(token, &state.config));
    tracing::info!(admin_id = %admin.id, "admin logged in with password");

    let user = auth::AdminUser {
        id: Some(admin.id),
        email: admin.email,
        name: admin.name,
        image: None,
        source: auth::AuthSource::Credentials,
    };
    Ok((
        jar,
        Json(AuthStatus {
            authenticated: true,
            user: Some(user.profile()),
        }),
    ))
}

/// logout
///
/// [Auth Route] Clears both the session and the legacy cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 204, description = "Logged out"))
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar
        .add(expired_cookie(SESSION_COOKIE, &state.config))
        .add(expired_cookie(LEGACY_COOKIE, &state.config));
    (jar, StatusCode::NO_CONTENT)
}

/// me
///
/// [Auth Route] Reports the caller's identity. Always 200; an anonymous caller
/// gets `authenticated: false`.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses((status = 200, description = "Current identity", body = AuthStatus))
)]
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthStatus> {
    let user = resolve_admin(&headers, state.repo.as_ref(), &state.config).await;
    Json(AuthStatus {
        authenticated: user.is_some(),
        user: user.map(|u| u.profile()),
    })
}

/// google_sign_in
///
/// [Auth Route] Starts the Google authorization-code flow. A random `state` is
/// stored in a short-lived cookie and checked again on the callback.
#[utoipa::path(
    get,
    path = "/api/auth/google",
    responses((status = 303, description = "Redirect to Google"))
)]
pub async fn google_sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Redirect)> {
    let csrf: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();

    let url = state.oauth.authorize_url(&csrf)?;
    let cookie = auth_cookie(
        OAUTH_STATE_COOKIE,
        csrf,
        time::Duration::minutes(OAUTH_STATE_TTL_MINUTES),
        &state.config,
    );
    Ok((jar.add(cookie), Redirect::to(&url)))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct GoogleCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by Google when the user cancels the consent screen.
    pub error: Option<String>,
}

fn login_error(jar: CookieJar, code: &str) -> (CookieJar, Redirect) {
    (jar, Redirect::to(&format!("/login?error={code}")))
}

/// google_callback
///
/// [Auth Route] Completes the Google flow. Every failure ends in a redirect to
/// `/login?error=<code>` rather than an error body, since the browser is
/// navigating here directly.
#[utoipa::path(
    get,
    path = "/api/auth/google/callback",
    params(GoogleCallback),
    responses(
        (status = 303, description = "Redirect to /admin on success or /login?error=... on failure")
    )
)]
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<GoogleCallback>,
) -> (CookieJar, Redirect) {
    let expected = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.add(expired_cookie(OAUTH_STATE_COOKIE, &state.config));

    if let Some(error) = params.error {
        tracing::info!(%error, "google sign-in cancelled");
        return login_error(jar, "access_denied");
    }

    let (Some(code), Some(returned)) = (params.code, params.state) else {
        return login_error(jar, "missing_code");
    };
    if expected.as_deref() != Some(returned.as_str()) {
        tracing::warn!("oauth state mismatch");
        return login_error(jar, "invalid_state");
    }

    let profile = match state.oauth.exchange_code(&code).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "google code exchange failed");
            return login_error(jar, "oauth_failed");
        }
    };

    if !is_authorized_email(&profile.email, state.repo.as_ref(), &state.config).await {
        tracing::warn!(email = %profile.email, "google account is not an admin");
        return login_error(jar, "not_authorized");
    }

    match auth::issue_session_token(&state.config, &profile.email, profile.name, profile.picture) {
        Ok(token) => {
            tracing::info!(email = %profile.email, "admin signed in with google");
            let jar = jar.add(auth::session_cookie(token, &state.config));
            (jar, Redirect::to("/admin"))
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to issue session token");
            login_error(jar, "server_error")
        }
    }
}
