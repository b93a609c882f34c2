use std::sync::Arc;

use bookmarks::bookmarks::LibsqlBookmarks;
use bookmarks::config::{Cli, Config, Environment, default_config_dir, default_config_path};
use bookmarks::db::Database;
use bookmarks::handler::{AppState, Settings};
use bookmarks::server::build_router;
use bookmarks::unpack_error;
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn init_tracing(environment: Environment) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if environment.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    // With --config, data (the database file) lives next to the config file.
    // Otherwise both live under ~/.bookmarks/
    let (config_path, data_dir) = match args.config_path {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            (path, dir)
        }
        None => (default_config_path(), default_config_dir()),
    };

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("failed to create data directory {:?}: {}", data_dir, e);
        std::process::exit(1);
    }

    let cfg = match Config::new(&config_path.to_string_lossy()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("failed to load config file {:?}: {}", config_path, unpack_error(&*e));
            std::process::exit(1);
        }
    };

    init_tracing(cfg.app.environment);
    for warning in &cfg.warnings {
        tracing::warn!("{}", warning);
    }
    tracing::info!(environment = ?cfg.app.environment, "bookmarks.svc starting");

    let db = Arc::new(Database::new(&cfg.app, &data_dir).await.unwrap_or_else(|e| {
        tracing::error!(error = %unpack_error(&*e), "failed to setup database");
        std::process::exit(1);
    }));

    let state = AppState::new(Arc::new(LibsqlBookmarks::new(db.clone())), Settings::from_config(&cfg));
    let app = build_router(state, &cfg.cors);

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    let cancellation_token = CancellationToken::new();
    let shutdown_token = cancellation_token.clone();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            return;
        }
        tracing::info!("ctrl+c signal received, preparing to shutdown");
        shutdown_token.cancel();
    });

    tracing::info!("bookmarks.svc running on {}", &address);
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(cancellation_token.cancelled_owned())
        .await
    {
        tracing::error!(error = %err, "server error");
        std::process::exit(1);
    }

    if let Err(e) = db.sync().await {
        tracing::warn!(error = %e, "final replica sync failed");
    }
    tracing::info!("bookmarks.svc going off, graceful shutdown complete");
}
