//! Shard Core - CSV edge lists to interactive graph views.
//!
//! This crate provides the logic behind Shard, a small web tool that turns two
//! columns of an uploaded CSV file into an undirected graph and renders it.
//!
//! # Pipeline
//!
//! ```text
//! CSV bytes -> Dataset -> EdgeGraph -> validate_nodes -> spring_layout -> HTML fragment
//!                  \
//!                   -> profile -> exploratory HTML fragment
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use shard_core::{dataset::Dataset, graph, layout, render};
//!
//! # fn main() -> shard_core::Result<()> {
//! let dataset = Dataset::from_path("edges.csv")?;
//! let graph = graph::build_graph(&dataset, "from", "to")?;
//! graph::validate_nodes(&graph)?;
//! let positions = layout::spring_layout(&graph, &layout::LayoutOptions::default());
//! let html = render::render_network(&graph, &positions, &render::RenderOptions::default())?;
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod error;
pub mod explore;
pub mod graph;
pub mod layout;
pub mod render;
mod templates;

pub use dataset::{Cell, ColumnType, Dataset};
pub use error::{Result, ShardError, ValidationError};
pub use graph::{build_graph, validate_nodes, EdgeGraph, NodeId};
pub use layout::{spring_layout, Layout, LayoutOptions, Position};

/// Get the version of shard-core.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
