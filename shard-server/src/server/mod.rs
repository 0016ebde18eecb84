//! HTTP server for Shard.
//!
//! Provides:
//! - Upload form and CSV ingestion with column selection
//! - Graph visualization and exploratory view
//! - Health check

mod error;
mod http;
mod pages;
pub mod state;

pub use error::AppError;
pub use http::create_router;
pub use pages::Pages;
pub use state::AppState;
