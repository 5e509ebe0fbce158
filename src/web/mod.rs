//! Web layer module
//!
//! This module provides the HTTP interface for the aggregator. Handlers are
//! thin: they clamp request parameters to valid ranges, delegate to the
//! story service, and map outcomes to status codes. Everything stateful
//! lives behind [`AppState`].

use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::service::StoryService;

pub mod api;

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: Config, service: StoryService) -> Result<Self> {
        let app = Self::router(AppState {
            service: Arc::new(service),
        });

        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;

        Ok(Self { app, addr })
    }

    /// Create the router with all routes and middleware
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(api::health_check))
            .nest("/api/v1", Self::api_v1_routes())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// API v1 routes
    fn api_v1_routes() -> Router<AppState> {
        Router::new()
            .route("/stories/newest", get(api::get_newest_stories))
            .route("/stories/:id", get(api::get_story))
    }

    /// Start the web server
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<StoryService>,
}
