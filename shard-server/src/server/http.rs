//! HTTP routes and handlers for the Shard web front end.

use axum::{
    extract::{rejection::FormRejection, DefaultBodyLimit, Multipart, State},
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use shard_core::explore::render_explore;
use shard_core::render::render_network;
use shard_core::{build_graph, spring_layout, validate_nodes, Dataset};

use super::error::AppError;
use super::pages::{SelectColumnsPage, VisualizePage};
use super::state::AppState;

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "csv_file";

type SharedState = Arc<AppState>;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes();

    Router::new()
        // Upload and column selection
        .route("/", get(index).post(upload))
        // Graph and exploratory view
        .route("/visualize", get(visualize_redirect).post(visualize))
        // Health
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn health() -> &'static str {
    "OK"
}

/// Run blocking work (file IO, parsing, layout) off the async runtime.
async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Worker task failed: {}", e)))?
}

// =============================================================================
// Upload
// =============================================================================

async fn index(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    Ok(Html(state.pages.index()?))
}

async fn upload(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        if !filename.is_empty() {
            upload = Some((filename, data));
        }
        break;
    }
    let (filename, data) = upload.ok_or(AppError::NoUpload)?;
    debug!("Received upload {} ({} bytes)", filename, data.len());

    let page = {
        let state = state.clone();
        run_blocking(move || ingest(&state, &filename, &data)).await?
    };
    Ok(Html(state.pages.select_columns(&page)?))
}

/// Store an upload and parse it for the column-selection page.
///
/// A file that fails to parse is removed again.
fn ingest(state: &AppState, filename: &str, data: &[u8]) -> Result<SelectColumnsPage, AppError> {
    let stored = state.storage.save(filename, data)?;
    let path = state.storage.path(&stored)?;

    let dataset = match Dataset::from_path(&path) {
        Ok(dataset) => dataset,
        Err(e) => {
            if let Err(cleanup) = state.storage.delete(&stored) {
                warn!("Failed to remove rejected upload {}: {}", stored, cleanup);
            }
            return Err(e.into());
        }
    };
    info!(
        "Parsed {}: {} rows, {} columns",
        stored,
        dataset.row_count(),
        dataset.columns().len()
    );

    Ok(SelectColumnsPage {
        columns: dataset.column_names(),
        dataframe_preview: dataset.preview_html(state.config.preview.rows)?,
        csv_file_path: stored,
        row_count: dataset.row_count(),
    })
}

// =============================================================================
// Visualize
// =============================================================================

#[derive(Debug, Deserialize)]
struct VisualizeForm {
    csv_file_path: Option<String>,
    source_col: Option<String>,
    target_col: Option<String>,
}

impl VisualizeForm {
    /// All three fields, or `MissingData` if any is absent or empty.
    fn into_parts(self) -> Result<(String, String, String), AppError> {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        match (
            present(self.csv_file_path),
            present(self.source_col),
            present(self.target_col),
        ) {
            (Some(file), Some(source), Some(target)) => Ok((file, source, target)),
            _ => Err(AppError::MissingData),
        }
    }
}

async fn visualize_redirect() -> impl IntoResponse {
    Redirect::to("/")
}

async fn visualize(
    State(state): State<SharedState>,
    form: Result<Form<VisualizeForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let Form(form) = form.map_err(|rejection| {
        debug!("Unreadable visualize form: {}", rejection);
        AppError::MissingData
    })?;
    let (file, source, target) = form.into_parts()?;

    let page = {
        let state = state.clone();
        run_blocking(move || build_views(&state, file, source, target)).await?
    };
    Ok(Html(state.pages.visualize(&page)?))
}

/// Load a stored upload and render both views for the chosen columns.
fn build_views(
    state: &AppState,
    file: String,
    source: String,
    target: String,
) -> Result<VisualizePage, AppError> {
    let start = Instant::now();
    let path = state.storage.path(&file)?;
    let dataset = Dataset::from_path(&path)?;

    let graph = build_graph(&dataset, &source, &target)?;
    validate_nodes(&graph)?;

    let layout = spring_layout(&graph, &state.config.layout_options());
    let net_html = render_network(&graph, &layout, &state.config.render_options())?;
    let explore_html = render_explore(&dataset, &state.config.explore_options())?;

    info!(
        "Visualized {} ({} -> {}): {} nodes, {} edges in {:?}",
        file,
        source,
        target,
        graph.node_count(),
        graph.edge_count(),
        start.elapsed()
    );

    Ok(VisualizePage {
        net_html,
        explore_html,
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        source_col: source,
        target_col: target,
    })
}
