//! Full HTML pages served by the handlers.

use minijinja::{context, Environment};
use serde::Serialize;

const BASE: &str = "base.html";
const INDEX: &str = "index.html";
const SELECT_COLUMNS: &str = "select_columns.html";
const VISUALIZE: &str = "visualize.html";

/// Data shown on the column-selection page.
#[derive(Debug, Serialize)]
pub struct SelectColumnsPage {
    pub columns: Vec<String>,
    pub dataframe_preview: String,
    pub csv_file_path: String,
    pub row_count: usize,
}

/// Data shown on the visualization page.
#[derive(Debug, Serialize)]
pub struct VisualizePage {
    pub net_html: String,
    pub explore_html: String,
    pub source_col: String,
    pub target_col: String,
    pub node_count: usize,
    pub edge_count: usize,
}

/// Page templates, compiled once at startup.
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(BASE, include_str!("../../templates/base.html"))?;
        env.add_template(INDEX, include_str!("../../templates/index.html"))?;
        env.add_template(
            SELECT_COLUMNS,
            include_str!("../../templates/select_columns.html"),
        )?;
        env.add_template(VISUALIZE, include_str!("../../templates/visualize.html"))?;
        Ok(Self { env })
    }

    pub fn index(&self) -> Result<String, minijinja::Error> {
        self.env.get_template(INDEX)?.render(context! {})
    }

    pub fn select_columns(&self, page: &SelectColumnsPage) -> Result<String, minijinja::Error> {
        self.env.get_template(SELECT_COLUMNS)?.render(page)
    }

    pub fn visualize(&self, page: &VisualizePage) -> Result<String, minijinja::Error> {
        self.env.get_template(VISUALIZE)?.render(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_has_upload_form() {
        let html = Pages::new().unwrap().index().unwrap();
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(html.contains("name=\"csv_file\""));
    }

    #[test]
    fn test_select_columns_escapes_names() {
        let page = SelectColumnsPage {
            columns: vec!["from".to_string(), "<to>".to_string()],
            dataframe_preview: "<table class=\"dataframe\"></table>".to_string(),
            csv_file_path: "edges.csv".to_string(),
            row_count: 3,
        };
        let html = Pages::new().unwrap().select_columns(&page).unwrap();

        assert!(html.contains("name=\"csv_file_path\" value=\"edges.csv\""));
        assert!(html.contains("<option value=\"from\">from</option>"));
        assert!(html.contains("&lt;to&gt;"));
        assert!(html.contains("<table class=\"dataframe\"></table>"));
    }

    #[test]
    fn test_visualize_embeds_fragments() {
        let page = VisualizePage {
            net_html: "<div id=\"shard-network\"></div>".to_string(),
            explore_html: "<div class=\"shard-explore\"></div>".to_string(),
            source_col: "from".to_string(),
            target_col: "to".to_string(),
            node_count: 3,
            edge_count: 2,
        };
        let html = Pages::new().unwrap().visualize(&page).unwrap();
        assert!(html.contains("<div id=\"shard-network\"></div>"));
        assert!(html.contains("<div class=\"shard-explore\"></div>"));
        assert!(html.contains("3 nodes"));
    }
}
