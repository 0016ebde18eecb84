//! Exploratory view of a whole dataset.
//!
//! Profiles every column (type, counts, numeric summary, most frequent values)
//! and renders the profile plus the raw table as an HTML fragment.

use serde::Serialize;
use std::collections::HashMap;

use crate::dataset::{format_float, ColumnType, Column, Dataset};
use crate::error::Result;
use crate::templates;

/// Number of most frequent values kept per column.
const TOP_VALUES: usize = 5;

/// How often a value occurs in a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
    /// Share of non-missing cells, in percent
    pub percent: f64,
}

/// Summary of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub column_type: ColumnType,
    /// Non-missing cells
    pub count: usize,
    pub missing: usize,
    pub distinct: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub top_values: Vec<ValueCount>,
}

/// Options for [`render_explore`].
#[derive(Debug, Clone)]
pub struct ExploreOptions {
    /// Maximum number of data rows included in the table
    pub max_rows: usize,
}

impl Default for ExploreOptions {
    fn default() -> Self {
        Self { max_rows: 1000 }
    }
}

/// Profile every column of a dataset.
pub fn profile(dataset: &Dataset) -> Vec<ColumnProfile> {
    dataset.columns().iter().map(profile_column).collect()
}

fn profile_column(column: &Column) -> ColumnProfile {
    let present: Vec<String> = column
        .cells
        .iter()
        .filter(|c| !c.is_missing())
        .map(|c| c.to_string())
        .collect();

    // value -> (count, first position)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, value) in present.iter().enumerate() {
        counts.entry(value.as_str()).or_insert((0, pos)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .iter()
        .map(|(value, (count, first))| (*value, *count, *first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let total = present.len();
    let top_values = ranked
        .iter()
        .take(TOP_VALUES)
        .map(|(value, count, _)| ValueCount {
            value: value.to_string(),
            count: *count,
            percent: *count as f64 * 100.0 / total as f64,
        })
        .collect();

    let (min, max, mean) = if column.column_type.is_numeric() {
        numeric_summary(column)
    } else {
        (None, None, None)
    };

    ColumnProfile {
        name: column.name.clone(),
        column_type: column.column_type,
        count: total,
        missing: column.cells.len() - total,
        distinct: counts.len(),
        min,
        max,
        mean,
        top_values,
    }
}

fn numeric_summary(column: &Column) -> (Option<f64>, Option<f64>, Option<f64>) {
    let values: Vec<f64> = column.cells.iter().filter_map(|c| c.as_f64()).collect();
    if values.is_empty() {
        return (None, None, None);
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (Some(min), Some(max), Some(mean))
}

/// Display form of a numeric summary value for a column type.
fn display_number(value: Option<f64>, column_type: ColumnType) -> String {
    match (value, column_type) {
        (None, _) => String::new(),
        (Some(v), ColumnType::Integer) if v.fract() == 0.0 => format!("{}", v as i64),
        (Some(v), _) => format_float((v * 1e4).round() / 1e4),
    }
}

#[derive(Serialize)]
struct ProfileRow<'a> {
    profile: &'a ColumnProfile,
    min: String,
    max: String,
    mean: String,
}

/// Render the dataset profile and table as an HTML fragment.
pub fn render_explore(dataset: &Dataset, options: &ExploreOptions) -> Result<String> {
    let profiles = profile(dataset);
    let rows: Vec<ProfileRow<'_>> = profiles
        .iter()
        .map(|p| ProfileRow {
            profile: p,
            min: display_number(p.min, p.column_type),
            max: display_number(p.max, p.column_type),
            mean: display_number(p.mean, ColumnType::Float),
        })
        .collect();

    let shown = dataset.row_count().min(options.max_rows);
    let data: Vec<(usize, Vec<String>)> = (0..shown)
        .filter_map(|i| {
            dataset
                .row(i)
                .map(|cells| (i, cells.iter().map(|c| c.to_string()).collect()))
        })
        .collect();

    let html = templates::environment()
        .get_template(templates::EXPLORE)?
        .render(minijinja::context! {
            row_count => dataset.row_count(),
            column_count => dataset.columns().len(),
            profiles => rows,
            columns => dataset.column_names(),
            data => data,
            truncated => dataset.row_count() > shown,
            shown => shown,
        })?;
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(data: &str) -> Dataset {
        Dataset::from_reader(data.as_bytes()).unwrap()
    }

    #[test]
    fn test_profile_counts() {
        let ds = dataset("city,pop\nParis,10\nRome,\nParis,30\nOslo,20\n");
        let profiles = profile(&ds);
        assert_eq!(profiles.len(), 2);

        let city = &profiles[0];
        assert_eq!(city.column_type, ColumnType::Text);
        assert_eq!(city.count, 4);
        assert_eq!(city.missing, 0);
        assert_eq!(city.distinct, 3);
        assert_eq!(city.top_values[0].value, "Paris");
        assert_eq!(city.top_values[0].count, 2);
        assert_eq!(city.top_values[1].value, "Rome");
        assert!((city.top_values[0].percent - 50.0).abs() < 1e-9);
        assert!(city.min.is_none());

        let pop = &profiles[1];
        assert_eq!(pop.column_type, ColumnType::Float);
        assert_eq!(pop.missing, 1);
        assert_eq!(pop.min, Some(10.0));
        assert_eq!(pop.max, Some(30.0));
        assert_eq!(pop.mean, Some(20.0));
    }

    #[test]
    fn test_top_values_are_capped() {
        let ds = dataset("v\na\nb\nc\nd\ne\nf\ng\n");
        let profiles = profile(&ds);
        assert_eq!(profiles[0].top_values.len(), TOP_VALUES);
        assert_eq!(profiles[0].distinct, 7);
    }

    #[test]
    fn test_all_missing_column() {
        let ds = dataset("a,b\n,1\n,2\n");
        let a = &profile(&ds)[0];
        assert_eq!(a.count, 0);
        assert_eq!(a.missing, 2);
        assert!(a.top_values.is_empty());
        assert!(a.mean.is_none());
    }

    #[test]
    fn test_display_number() {
        assert_eq!(display_number(Some(3.0), ColumnType::Integer), "3");
        assert_eq!(display_number(Some(2.0), ColumnType::Float), "2.0");
        assert_eq!(display_number(Some(1.0 / 3.0), ColumnType::Float), "0.3333");
        assert_eq!(display_number(None, ColumnType::Float), "");
    }

    #[test]
    fn test_render_explore() {
        let ds = dataset("from,to\nA,B\n<i>x</i>,C\nA,D\n");
        let html = render_explore(&ds, &ExploreOptions::default()).unwrap();

        assert!(html.contains("shard-explore"));
        assert!(html.contains("3 rows"));
        assert!(html.contains("<td>text</td>"));
        assert!(html.contains("&lt;i&gt;x"));
        assert!(!html.contains("<i>x"));
        assert!(!html.contains("Showing the first"));
    }

    #[test]
    fn test_render_explore_truncates_rows() {
        let ds = dataset("n\n1\n2\n3\n4\n");
        let html = render_explore(&ds, &ExploreOptions { max_rows: 2 }).unwrap();
        assert!(html.contains("Showing the first 2 of 4 rows"));
    }
}
