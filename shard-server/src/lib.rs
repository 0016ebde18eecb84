//! Shard server library.
//!
//! This library provides:
//! - Configuration loading (`.shardrc.toml`)
//! - Upload storage for CSV files
//! - The HTTP router serving the upload, column-selection and graph pages

pub mod config;
pub mod server;
pub mod storage;
