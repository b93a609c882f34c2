use std::sync::Arc;

use axum::{Json, response::IntoResponse};
use serde_json::json;
use tracing::info;

use crate::bookmarks::BookmarkRepository;
use crate::config::{Config, Environment};

/// Process-wide request settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub environment: Environment,
}

impl Settings {
    pub fn from_config(cfg: &Config) -> Self {
        Settings {
            api_key: cfg.app.api_key.clone(),
            environment: cfg.app.environment,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub bookmarks: Arc<dyn BookmarkRepository>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(bookmarks: Arc<dyn BookmarkRepository>, settings: Settings) -> Self {
        AppState {
            bookmarks,
            settings: Arc::new(settings),
        }
    }
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(json!({ "status": "ok" }))
}
