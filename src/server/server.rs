//! HTTP server core implementation

use crate::config::{Config, ServerConfig};
use crate::server::handlers;
use crate::server::state::AppState;
use crate::utils::error::{DisperserError, Result};
use actix_web::{
    App, HttpServer as ActixHttpServer,
    middleware::{DefaultHeaders, Logger},
    web,
};
use tracing::info;

/// HTTP ingress for push deliveries and direct submissions
#[derive(Debug)]
pub struct HttpServer {
    config: ServerConfig,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        Ok(Self::with_state(AppState::new(config.clone())?))
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            config: state.config.server().clone(),
            state,
        }
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let payload_limit = state.config.server().max_body_size;

        App::new()
            .app_data(state)
            .app_data(web::PayloadConfig::new(payload_limit))
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("Server", crate::NAME)))
            .configure(handlers::configure_routes)
    }

    /// Bind and serve until shutdown
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();

        info!("Starting HTTP server on {}", bind_addr);

        let state = web::Data::new(self.state);

        let server = ActixHttpServer::new(move || Self::create_app(state.clone()))
            .bind(&bind_addr)
            .map_err(|e| Self::format_bind_error(e, &bind_addr))?
            .run();

        info!("HTTP server listening on {}", bind_addr);

        server
            .await
            .map_err(|e| DisperserError::server(format!("Server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }

    fn format_bind_error(err: std::io::Error, bind_addr: &str) -> DisperserError {
        match err.kind() {
            std::io::ErrorKind::AddrInUse => DisperserError::server(format!(
                "Address {} is already in use; set PORT or server.port to another value",
                bind_addr
            )),
            std::io::ErrorKind::PermissionDenied => DisperserError::server(format!(
                "Permission denied binding {}; ports below 1024 need elevated privileges",
                bind_addr
            )),
            _ => DisperserError::server(format!("Failed to bind {}: {}", bind_addr, err)),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}
