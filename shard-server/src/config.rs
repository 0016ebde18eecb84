//! Shard configuration loading from `.shardrc.toml`.
//!
//! Configuration is optional - every section falls back to defaults, and
//! command-line flags override whatever the file sets.
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8000
//!
//! [storage]
//! upload_dir = "uploads"
//! max_upload_mb = 25
//!
//! [preview]
//! rows = 5
//!
//! [layout]
//! seed = 42
//! iterations = 50
//! scale = 1.0
//!
//! [render]
//! height = "750px"
//! width = "100%"
//! physics = true
//!
//! [explore]
//! max_rows = 1000
//! ```

use serde::Deserialize;
use shard_core::explore::ExploreOptions;
use shard_core::layout::{LayoutOptions, DEFAULT_ITERATIONS, DEFAULT_SEED};
use shard_core::render::RenderOptions;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".shardrc.toml";

/// Default port for the HTTP server.
pub const DEFAULT_PORT: u16 = 8000;

/// Root configuration structure loaded from `.shardrc.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ShardConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub explore: ExploreConfig,
}

/// Listen address.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
        }
    }
}

/// Where uploads are written and how large they may be.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding uploaded CSV files.
    ///
    /// Relative paths are resolved against the working directory.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Maximum request body size for uploads, in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_mb() -> usize {
    25
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

/// Column-selection preview.
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "default_preview_rows")]
    pub rows: usize,
}

fn default_preview_rows() -> usize {
    shard_core::dataset::DEFAULT_PREVIEW_ROWS
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            rows: default_preview_rows(),
        }
    }
}

/// Spring layout parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Largest absolute coordinate handed to the renderer.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

fn default_scale() -> f64 {
    1.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            iterations: DEFAULT_ITERATIONS,
            scale: default_scale(),
        }
    }
}

/// Network canvas settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_height")]
    pub height: String,

    #[serde(default = "default_width")]
    pub width: String,

    #[serde(default = "default_physics")]
    pub physics: bool,
}

fn default_height() -> String {
    "750px".to_string()
}

fn default_width() -> String {
    "100%".to_string()
}

fn default_physics() -> bool {
    true
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            height: default_height(),
            width: default_width(),
            physics: default_physics(),
        }
    }
}

/// Exploratory view settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ExploreConfig {
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

fn default_max_rows() -> usize {
    1000
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
        }
    }
}

impl ShardConfig {
    /// Load configuration from `.shardrc.toml` in the given directory.
    ///
    /// If the file doesn't exist or can't be parsed, returns defaults.
    /// Parse errors are logged as warnings but don't cause failures.
    pub fn load(root: &Path) -> Self {
        Self::load_file(&root.join(CONFIG_FILE))
    }

    /// Load configuration from an explicit file path.
    pub fn load_file(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", config_path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", config_path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Address string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Upload body limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.storage.max_upload_mb * 1024 * 1024
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            seed: self.layout.seed,
            iterations: self.layout.iterations,
            scale: self.layout.scale,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            height: self.render.height.clone(),
            width: self.render.width.clone(),
            physics: self.render.physics,
        }
    }

    pub fn explore_options(&self) -> ExploreOptions {
        ExploreOptions {
            max_rows: self.explore.max_rows,
        }
    }
}
