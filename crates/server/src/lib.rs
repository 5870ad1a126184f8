//! Handscribe Server - HTTP API for handwriting style profiles and generation
//!
//! Thin axum surface over [`handscribe::Pipeline`]:
//!
//! - **Sample submission**: multipart upload of handwriting scans, stored as a
//!   per-user style profile
//! - **Generation**: render text in a stored style, persisted under
//!   `generated_images/` and returned as a public URL
//! - **Health & Metrics**: liveness probe and Prometheus exposition
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /metrics` - Prometheus metrics
//! - `POST /api/submit-handwriting` (alias `/api/submit-samples`) - Submit samples
//! - `POST /api/generate` - Generate an image, returns `{"imageUrl"}`
//! - `GET /generated_images/{file}` - Generated PNGs
//!
//! There is no authentication; user ids are taken as given.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
