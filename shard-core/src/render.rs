//! Interactive network HTML fragments.
//!
//! [`NetworkView`] is the render target: nodes are added with explicit
//! coordinates first, then edges that reference them. The view serializes to a
//! self-contained HTML fragment backed by vis-network, with navigation buttons,
//! hover highlighting, drag and zoom.

use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{Result, ShardError};
use crate::graph::{EdgeGraph, NodeId};
use crate::layout::Position;
use crate::templates;

/// Size and behaviour of the rendered network.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// CSS height of the canvas
    pub height: String,
    /// CSS width of the canvas
    pub width: String,
    /// Let the browser keep simulating after the initial layout
    pub physics: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            height: "750px".to_string(),
            width: "100%".to_string(),
            physics: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct VisNode {
    id: usize,
    label: String,
    title: String,
    x: f64,
    y: f64,
}

#[derive(Debug, Clone, Serialize)]
struct VisEdge {
    from: usize,
    to: usize,
}

/// Render target for one network.
///
/// Node ids in the output are dense indices so that text and integer
/// identifiers with the same display form never collide in the browser.
#[derive(Debug, Clone)]
pub struct NetworkView {
    options: RenderOptions,
    nodes: Vec<VisNode>,
    edges: Vec<VisEdge>,
    index: HashMap<NodeId, usize>,
}

impl NetworkView {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            nodes: Vec::new(),
            edges: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add a node at a fixed position. Adding the same node again is a no-op.
    pub fn add_node(&mut self, id: &NodeId, position: Position) -> usize {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.nodes.len();
        let label = id.to_string();
        self.nodes.push(VisNode {
            id: idx,
            title: label.clone(),
            label,
            x: position.x,
            y: position.y,
        });
        self.index.insert(id.clone(), idx);
        idx
    }

    /// Add an edge between two nodes that were already added.
    pub fn add_edge(&mut self, a: &NodeId, b: &NodeId) -> Result<()> {
        let from = self.lookup(a)?;
        let to = self.lookup(b)?;
        self.edges.push(VisEdge { from, to });
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn lookup(&self, id: &NodeId) -> Result<usize> {
        self.index.get(id).copied().ok_or_else(|| ShardError::Render {
            message: format!("Non existent node '{}'", id),
        })
    }

    /// Serialize the view to an embeddable HTML fragment.
    pub fn to_html(&self) -> Result<String> {
        let vis_options = json!({
            "physics": {
                "enabled": self.options.physics,
                "stabilization": { "iterations": 100 },
            },
            "interaction": {
                "navigationButtons": true,
                "hover": true,
                "dragNodes": true,
                "zoomView": true,
            },
            "nodes": { "shape": "dot", "size": 10 },
            "edges": { "smooth": false, "color": { "inherit": true } },
        });

        let html = templates::environment()
            .get_template(templates::NETWORK)?
            .render(minijinja::context! {
                height => self.options.height,
                width => self.options.width,
                nodes => self.nodes,
                edges => self.edges,
                options => vis_options,
            })?;
        Ok(html)
    }
}

/// Lay a graph into a [`NetworkView`] and render it.
///
/// `layout` must hold one position per node, in node order.
pub fn render_network(
    graph: &EdgeGraph,
    layout: &[Position],
    options: &RenderOptions,
) -> Result<String> {
    if layout.len() != graph.node_count() {
        return Err(ShardError::Render {
            message: format!(
                "Layout has {} positions for {} nodes",
                layout.len(),
                graph.node_count()
            ),
        });
    }

    let mut view = NetworkView::new(options.clone());
    for (node, position) in graph.nodes().zip(layout) {
        view.add_node(node, *position);
    }
    for (a, b) in graph.edges() {
        view.add_edge(a, b)?;
    }

    debug!(
        "Rendering network: {} nodes, {} edges",
        view.node_count(),
        view.edge_count()
    );
    view.to_html()
}
