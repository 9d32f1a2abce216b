//! HTTP server implementation
//!
//! Routes Pub/Sub push deliveries and direct submissions into the batch pipeline.

pub mod builder;
mod handlers;
pub mod server;
pub mod state;


pub use builder::run_server;
pub use handlers::API_KEY_HEADER;
pub use server::HttpServer;
pub use state::AppState;
