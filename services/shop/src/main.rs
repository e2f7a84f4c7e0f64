use std::time::Duration;

use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use fusion_core::config::Config;
use fusion_core::tracing::init_tracing;
use fusion_shop::config::ShopConfig;
use fusion_shop::infra::mail::MailTransport;
use fusion_shop::infra::storage::LocalBlobStore;
use fusion_shop::router::build_router;
use fusion_shop::state::AppState;
use fusion_shop::usecase::auth::TokenSettings;
use fusion_shop_migration::{Migrator, MigratorTrait};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the process environment still applies.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ShopConfig::from_env().context("failed to load configuration")?;

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    Migrator::up(&db, None)
        .await
        .context("failed to run migrations")?;

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("failed to create {}", config.upload_dir.display()))?;
    let mailer = MailTransport::from_config(&config)?;
    if matches!(mailer, MailTransport::Log) {
        info!("SMTP_HOST not set, outgoing mail will be logged");
    }

    let state = AppState {
        db,
        tokens: TokenSettings {
            jwt_secret: config.jwt_secret,
            access_ttl: Duration::from_secs(config.access_token_ttl_secs),
            refresh_ttl: Duration::from_secs(config.refresh_token_ttl_secs),
        },
        mailer,
        blobs: LocalBlobStore::new(config.upload_dir),
        verification_ttl_secs: i64::try_from(config.verification_ttl_secs)
            .context("VERIFICATION_TTL_SECS out of range")?,
        max_avatar_bytes: config.max_avatar_bytes,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.shop_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("shop service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}
