use club_site::{
    AppConfig,
    config::{ConfigError, Env},
};
use serial_test::serial;
use std::{env, panic};

/// Every variable these tests touch. Each test starts with all of them unset
/// except those it sets explicitly, and the originals are restored afterwards.
const MANAGED_VARS: &[&str] = &[
    "APP_ENV",
    "HOST",
    "MONGODB_URI",
    "JWT_SECRET",
    "SESSION_SECRET",
    "GOOGLE_CLIENT_ID",
    "GOOGLE_CLIENT_SECRET",
    "CLOUDINARY_CLOUD_NAME",
    "CLOUDINARY_API_KEY",
    "CLOUDINARY_API_SECRET",
    "ADMIN_EMAILS",
    "CONTACT_RATE_LIMIT_MAX",
    "CONTACT_RATE_LIMIT_WINDOW_SECS",
    "PUBLIC_URL",
    "PORT",
    "ALLOWED_ORIGINS",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with exactly `vars` set among `MANAGED_VARS`, then restores the
/// previous environment even if the test panicked.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = MANAGED_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in MANAGED_VARS.iter().copied() {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

const PRODUCTION_SECRETS: [(&str, &str); 9] = [
    ("APP_ENV", "production"),
    ("MONGODB_URI", "mongodb://db.internal:27017"),
    ("JWT_SECRET", "prod-jwt"),
    ("SESSION_SECRET", "prod-session"),
    ("GOOGLE_CLIENT_ID", "gid"),
    ("GOOGLE_CLIENT_SECRET", "gsecret"),
    ("CLOUDINARY_CLOUD_NAME", "club"),
    ("CLOUDINARY_API_KEY", "key"),
    ("CLOUDINARY_API_SECRET", "secret"),
];

// --- Tests ---

#[test]
#[serial]
fn production_requires_a_database() {
    let result = run_with_env(&[("APP_ENV", "production")], AppConfig::load);

    assert_eq!(result.unwrap_err(), ConfigError::Missing("MONGODB_URI"));
}

#[test]
#[serial]
fn production_names_the_first_missing_secret() {
    let vars: Vec<_> = PRODUCTION_SECRETS
        .into_iter()
        .filter(|(key, _)| *key != "SESSION_SECRET")
        .collect();

    let result = run_with_env(&vars, AppConfig::load);

    assert_eq!(result.unwrap_err(), ConfigError::Missing("SESSION_SECRET"));
}

#[test]
#[serial]
fn production_loads_when_every_secret_is_present() {
    let config = run_with_env(&PRODUCTION_SECRETS, AppConfig::load).unwrap();

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.host, "0.0.0.0");
    assert!(config.cookie_secure());
    assert_eq!(config.jwt_secret, "prod-jwt");
}

#[test]
#[serial]
fn local_mode_falls_back_to_development_defaults() {
    let config = run_with_env(&[], AppConfig::load).unwrap();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.mongodb_uri, None);
    assert_eq!(config.jwt_secret, AppConfig::default().jwt_secret);
    assert_eq!(config.contact_rate_limit_max, 5);
    assert_eq!(config.contact_rate_limit_window_secs, 900);
    assert!(!config.cookie_secure());
}

#[test]
#[serial]
fn admin_emails_are_trimmed_and_lowercased() {
    let config = run_with_env(
        &[("ADMIN_EMAILS", " Chair@Club.org, ,treasurer@club.org ")],
        AppConfig::load,
    )
    .unwrap();

    assert_eq!(config.admin_emails, ["chair@club.org", "treasurer@club.org"]);
    assert!(config.is_admin_email("CHAIR@club.org"));
    assert!(!config.is_admin_email("member@club.org"));
}

#[test]
#[serial]
fn unparsable_numbers_are_reported() {
    let result = run_with_env(&[("CONTACT_RATE_LIMIT_MAX", "lots")], AppConfig::load);

    assert_eq!(
        result.unwrap_err(),
        ConfigError::Invalid {
            var: "CONTACT_RATE_LIMIT_MAX",
            value: "lots".to_string()
        }
    );
}

#[test]
#[serial]
fn redirect_url_is_derived_from_public_url() {
    let config = run_with_env(&[("PUBLIC_URL", "https://club.example.org/")], AppConfig::load)
        .unwrap();

    assert_eq!(
        config.google_redirect_url(),
        "https://club.example.org/api/auth/google/callback"
    );
}

#[test]
#[serial]
fn wildcard_cors_origin_is_rejected() {
    let result = run_with_env(
        &[("ALLOWED_ORIGINS", "https://club.example.org, *")],
        AppConfig::load,
    );

    assert_eq!(
        result.unwrap_err(),
        ConfigError::Invalid {
            var: "ALLOWED_ORIGINS",
            value: "*".to_string()
        }
    );
}

#[test]
#[serial]
fn allowed_origins_default_to_the_public_url() {
    let config = run_with_env(&[("PUBLIC_URL", "https://club.example.org/")], AppConfig::load)
        .unwrap();

    assert_eq!(config.allowed_origins, ["https://club.example.org"]);
}
