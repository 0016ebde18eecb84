//! Embedded HTML templates for the fragments this crate renders.

use minijinja::Environment;
use once_cell::sync::Lazy;

pub(crate) const PREVIEW: &str = "preview.html";
pub(crate) const NETWORK: &str = "network.html";
pub(crate) const EXPLORE: &str = "explore.html";

static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    for (name, source) in [
        (PREVIEW, include_str!("../templates/preview.html")),
        (NETWORK, include_str!("../templates/network.html")),
        (EXPLORE, include_str!("../templates/explore.html")),
    ] {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!("Failed to load template {}: {}", name, e);
        }
    }
    env
});

/// Shared template environment. Names ending in `.html` are auto-escaped.
pub(crate) fn environment() -> &'static Environment<'static> {
    &ENV
}
