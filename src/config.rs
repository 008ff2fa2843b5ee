use std::env;

/// ConfigError
///
/// Raised by `AppConfig::load` when a variable required by the current runtime
/// environment is absent or unparsable. Startup aborts on any of these.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },
}

/// AppConfig
///
/// Holds the application's entire configuration state. Immutable once loaded and
/// pulled into handlers through `FromRef<AppState>`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub env: Env,
    pub host: String,
    pub port: u16,
    // Absolute origin of the site, used to build OAuth redirect URLs.
    pub public_url: String,

    // MongoDB connection string. `None` in local mode selects the in-memory store.
    pub mongodb_uri: Option<String>,
    pub mongodb_db: String,

    // Signs the legacy `token` cookie issued by password login.
    pub jwt_secret: String,
    // Signs the `club_session` cookie issued after Google sign-in.
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub legacy_token_ttl_hours: i64,

    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_auth_url: String,
    pub google_token_url: String,
    pub google_userinfo_url: String,

    // Lowercased allowlist of Google accounts granted admin access.
    pub admin_emails: Vec<String>,
    pub bootstrap_admin: Option<(String, String)>,

    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    pub cloudinary_folder: String,
    pub cloudinary_api_base: String,
    pub max_upload_bytes: usize,

    pub contact_rate_limit_max: u32,
    pub contact_rate_limit_window_secs: u64,

    // Directory holding the prebuilt frontend bundle.
    pub static_dir: String,
    pub allowed_origins: Vec<String>,
}

/// Env
///
/// Runtime context. `Local` enables development fallbacks (in-memory store,
/// header bypass, non-secure cookies); `Production` demands every secret.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_JWT_SECRET: &str = "local-legacy-jwt-secret-change-me";
const LOCAL_SESSION_SECRET: &str = "local-session-secret-change-me";

impl Default for AppConfig {
    /// Safe, non-panicking values used to scaffold test state.
    fn default() -> Self {
        Self {
            env: Env::Local,
            host: "127.0.0.1".to_string(),
            port: 3000,
            public_url: "http://localhost:3000".to_string(),
            mongodb_uri: None,
            mongodb_db: "club_site_test".to_string(),
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            session_secret: LOCAL_SESSION_SECRET.to_string(),
            session_ttl_hours: 24 * 30,
            legacy_token_ttl_hours: 24 * 7,
            google_client_id: "test-client-id".to_string(),
            google_client_secret: "test-client-secret".to_string(),
            google_auth_url: GOOGLE_AUTH_URL.to_string(),
            google_token_url: GOOGLE_TOKEN_URL.to_string(),
            google_userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            admin_emails: vec!["admin@club.test".to_string()],
            bootstrap_admin: None,
            cloudinary_cloud_name: "demo".to_string(),
            cloudinary_api_key: "test-key".to_string(),
            cloudinary_api_secret: "test-secret".to_string(),
            cloudinary_folder: "club-site".to_string(),
            cloudinary_api_base: CLOUDINARY_API_BASE.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            contact_rate_limit_max: 5,
            contact_rate_limit_window_secs: 900,
            static_dir: "public".to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
pub const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from the process environment. In `Env::Production`
    /// each secret is mandatory and a missing one is reported as
    /// `ConfigError::Missing`; in `Env::Local` development fallbacks are used.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };
        let defaults = Self::default();

        // Resolves a secret: required in production, defaulted locally.
        let secret = |var: &'static str, fallback: &str| -> Result<String, ConfigError> {
            match (env::var(var), &env) {
                (Ok(value), _) if !value.is_empty() => Ok(value),
                (_, Env::Production) => Err(ConfigError::Missing(var)),
                (_, Env::Local) => Ok(fallback.to_string()),
            }
        };

        let mongodb_uri = match (env::var("MONGODB_URI").ok(), &env) {
            (Some(uri), _) if !uri.is_empty() => Some(uri),
            (_, Env::Production) => return Err(ConfigError::Missing("MONGODB_URI")),
            (_, Env::Local) => None,
        };

        let bootstrap_admin = match (
            env::var("ADMIN_BOOTSTRAP_EMAIL").ok(),
            env::var("ADMIN_BOOTSTRAP_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email.trim().to_lowercase(), password))
            }
            _ => None,
        };

        let port = parse_or("PORT", defaults.port)?;
        let public_url = env::var("PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        // Credentialed CORS cannot use a wildcard origin.
        let allowed_origins = list_or("ALLOWED_ORIGINS", vec![public_url.clone()]);
        if let Some(wildcard) = allowed_origins.iter().find(|origin| origin.as_str() == "*") {
            return Err(ConfigError::Invalid {
                var: "ALLOWED_ORIGINS",
                value: wildcard.clone(),
            });
        }

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| match &env {
                Env::Production => "0.0.0.0".to_string(),
                Env::Local => defaults.host.clone(),
            }),
            port,
            allowed_origins,
            public_url,
            mongodb_uri,
            mongodb_db: env::var("MONGODB_DB").unwrap_or_else(|_| "club_site".to_string()),
            jwt_secret: secret("JWT_SECRET", LOCAL_JWT_SECRET)?,
            session_secret: secret("SESSION_SECRET", LOCAL_SESSION_SECRET)?,
            session_ttl_hours: parse_or("SESSION_TTL_HOURS", defaults.session_ttl_hours)?,
            legacy_token_ttl_hours: parse_or(
                "LEGACY_TOKEN_TTL_HOURS",
                defaults.legacy_token_ttl_hours,
            )?,
            google_client_id: secret("GOOGLE_CLIENT_ID", "")?,
            google_client_secret: secret("GOOGLE_CLIENT_SECRET", "")?,
            google_auth_url: env::var("GOOGLE_AUTH_URL").unwrap_or(defaults.google_auth_url),
            google_token_url: env::var("GOOGLE_TOKEN_URL").unwrap_or(defaults.google_token_url),
            google_userinfo_url: env::var("GOOGLE_USERINFO_URL")
                .unwrap_or(defaults.google_userinfo_url),
            admin_emails: list_or("ADMIN_EMAILS", Vec::new())
                .into_iter()
                .map(|email| email.to_lowercase())
                .collect(),
            bootstrap_admin,
            cloudinary_cloud_name: secret("CLOUDINARY_CLOUD_NAME", "demo")?,
            cloudinary_api_key: secret("CLOUDINARY_API_KEY", "")?,
            cloudinary_api_secret: secret("CLOUDINARY_API_SECRET", "")?,
            cloudinary_folder: env::var("CLOUDINARY_FOLDER").unwrap_or(defaults.cloudinary_folder),
            cloudinary_api_base: env::var("CLOUDINARY_API_BASE")
                .unwrap_or(defaults.cloudinary_api_base),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            contact_rate_limit_max: parse_or(
                "CONTACT_RATE_LIMIT_MAX",
                defaults.contact_rate_limit_max,
            )?,
            contact_rate_limit_window_secs: parse_or(
                "CONTACT_RATE_LIMIT_WINDOW_SECS",
                defaults.contact_rate_limit_window_secs,
            )?,
            static_dir: env::var("STATIC_DIR").unwrap_or(defaults.static_dir),
            env,
        })
    }

    /// Case-insensitive membership test against `ADMIN_EMAILS`.
    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|allowed| *allowed == email)
    }

    pub fn cookie_secure(&self) -> bool {
        self.env == Env::Production
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn google_redirect_url(&self) -> String {
        format!("{}/api/auth/google/callback", self.public_url)
    }
}

fn parse_or<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(default),
    }
}

fn list_or(var: &str, default: Vec<String>) -> Vec<String> {
    match env::var(var) {
        Ok(value) => value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => default,
    }
}
