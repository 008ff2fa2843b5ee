use anyhow::Context;
use club_site::{
    AppState, CloudinaryClient, GoogleOAuthClient, InMemoryRepository, MongoRepository,
    OAuthState, RateLimiter, RepositoryState, StorageState,
    bootstrap::bootstrap_admin,
    config::{AppConfig, Env},
    create_router,
};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(30);

/// main
///
/// Loads configuration, sets up logging, connects the persistence layer and
/// the outbound clients, then serves the router until the process stops.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = AppConfig::load().context("invalid configuration")?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "club_site=debug,tower_http=info".into());

    // Human-readable logs locally, JSON for the log aggregator in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    let repo: RepositoryState = match &config.mongodb_uri {
        Some(uri) => {
            let mongo = MongoRepository::connect(uri, &config.mongodb_db)
                .await
                .context("failed to connect to MongoDB; check MONGODB_URI")?;
            mongo
                .ensure_indexes()
                .await
                .context("failed to create MongoDB indexes")?;
            tracing::info!(db = %config.mongodb_db, "connected to MongoDB");
            Arc::new(mongo)
        }
        None => {
            tracing::warn!("MONGODB_URI not set; using the in-memory store, data will not persist");
            Arc::new(InMemoryRepository::new())
        }
    };

    bootstrap_admin(repo.as_ref(), &config)
        .await
        .context("failed to create the bootstrap admin")?;

    let storage: StorageState = Arc::new(
        CloudinaryClient::new(&config, OUTBOUND_TIMEOUT).context("failed to build image client")?,
    );
    let oauth: OAuthState = Arc::new(
        GoogleOAuthClient::new(&config, OUTBOUND_TIMEOUT).context("failed to build OAuth client")?,
    );
    let rate_limiter = Arc::new(RateLimiter::from_config(&config));

    let address = config.bind_address();
    let app = create_router(AppState {
        repo,
        storage,
        oauth,
        rate_limiter,
        config,
    });

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!("Listening on {address}");
    tracing::info!("API Documentation (Swagger UI) available at: http://{address}/swagger-ui");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
