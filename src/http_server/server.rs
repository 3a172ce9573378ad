//! # HTTP Server
//!
//! Binds the listener, wraps the REST router in CORS and serves until a
//! shutdown signal arrives. The database is closed once serving stops.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::core::AppContext;
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::rest_api::RestServer;

use super::config::HttpServerConfig;

/// HTTP server for one database
pub struct HttpServer {
    config: HttpServerConfig,
    ctx: AppContext,
    router: Router,
}

impl HttpServer {
    /// Create a server answering for `ctx`; raw mode follows the config.
    pub fn new(config: HttpServerConfig, ctx: AppContext) -> Self {
        let ctx = ctx.with_raw(config.allow_raw);
        let router = Self::build_router(&config, ctx.clone());
        Self {
            config,
            ctx,
            router,
        }
    }

    fn build_router(config: &HttpServerConfig, ctx: AppContext) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        RestServer::new(ctx, config.prefix())
            .with_request_log(config.log_requests)
            .router()
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C, then close the database.
    ///
    /// The database is closed even when the listener cannot be bound.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let HttpServer {
            config,
            ctx,
            router,
        } = self;
        let served = serve(&config, router).await;

        log_event(Event::ShutdownStart);
        match ctx.executor().close().await {
            Ok(()) => log_event(Event::ShutdownComplete),
            Err(e) => {
                let reason = e.to_string();
                log_event_with_fields(Event::ShutdownComplete, &[("close_error", reason.as_str())]);
            }
        }

        served
    }
}

async fn serve(config: &HttpServerConfig, router: Router) -> Result<(), std::io::Error> {
    let addr: SocketAddr = config
        .socket_addr()
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?.to_string();
    let prefix = config.prefix();
    log_event_with_fields(
        Event::Serving,
        &[("addr", local.as_str()), ("prefix", prefix.as_str())],
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    // A failed signal handler is treated like a signal
    let _ = tokio::signal::ctrl_c().await;
}
