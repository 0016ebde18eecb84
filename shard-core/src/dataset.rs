//! Tabular datasets parsed from CSV.
//!
//! A [`Dataset`] is an ordered list of named columns. Every column carries an
//! inferred [`ColumnType`] and one [`Cell`] per row. Parsing follows the usual
//! dataframe conventions so that a file behaves the same way users expect from
//! spreadsheet and notebook tools:
//!
//! - the first record is the header
//! - blank headers become `Unnamed: <index>`, duplicate headers get `.1`, `.2`, ...
//! - well-known NA tokens (`NA`, `NaN`, `null`, empty field, ...) become [`Cell::Missing`]
//! - a column with no missing cells whose values all parse as integers is an
//!   integer column, otherwise if the present values all parse as floats it is a
//!   float column, otherwise it is text

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, ShardError};
use crate::templates;

/// Tokens treated as missing values.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Number of rows shown by [`Dataset::preview_html`] when no count is configured.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// A single scalar value in a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Empty field or NA token
    Missing,
    /// Value of an integer column
    Integer(i64),
    /// Value of a float column
    Float(f64),
    /// Value of a text column, kept verbatim
    Text(String),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numeric view of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => write!(f, "NaN"),
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Float(v) => write!(f, "{}", format_float(*v)),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Format a float the way a dataframe prints it: integral values keep a `.0`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{}inf", sign)
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Text,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub cells: Vec<Cell>,
}

impl Column {
    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_missing()).count()
    }
}

/// An in-memory table parsed from a CSV upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Parse a CSV file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading CSV from {:?}", path);
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse CSV data from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(ShardError::CsvRead {
                message: "No columns to parse from file".to_string(),
            });
        }

        let names = normalize_headers(&headers);
        let width = names.len();
        let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); width];

        for result in reader.records() {
            let record = result?;
            if record.len() > width {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                return Err(ShardError::CsvRead {
                    message: format!(
                        "Error tokenizing data. Expected {} fields in line {}, saw {}",
                        width,
                        line,
                        record.len()
                    ),
                });
            }
            for (idx, column) in raw.iter_mut().enumerate() {
                let value = record.get(idx).filter(|v| !is_na(v)).map(str::to_string);
                column.push(value);
            }
        }

        let row_count = raw.first().map(Vec::len).unwrap_or(0);
        let columns = names
            .into_iter()
            .zip(raw)
            .map(|(name, values)| {
                let (column_type, cells) = infer_column(values);
                Column {
                    name,
                    column_type,
                    cells,
                }
            })
            .collect();

        Ok(Self { columns, row_count })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Cells of one row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Cell>> {
        if index >= self.row_count {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.cells[index]).collect())
    }

    /// Render the first `rows` rows as an HTML table with an index column.
    pub fn preview_html(&self, rows: usize) -> Result<String> {
        let body: Vec<(usize, Vec<String>)> = (0..self.row_count.min(rows))
            .filter_map(|i| {
                self.row(i)
                    .map(|cells| (i, cells.iter().map(|c| c.to_string()).collect()))
            })
            .collect();

        let html = templates::environment()
            .get_template(templates::PREVIEW)?
            .render(minijinja::context! {
                columns => self.column_names(),
                rows => body,
            })?;
        Ok(html)
    }
}

fn is_na(value: &str) -> bool {
    NA_VALUES.contains(&value)
}

/// Apply blank-header and duplicate-header renaming.
fn normalize_headers(headers: &StringRecord) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(headers.len());

    for (idx, raw) in headers.iter().enumerate() {
        let mut name = if raw.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            raw.to_string()
        };

        let mut current = counts.get(&name).copied().unwrap_or(0);
        while current > 0 {
            counts.insert(name.clone(), current + 1);
            name = format!("{}.{}", name, current);
            current = counts.get(&name).copied().unwrap_or(0);
        }
        counts.insert(name.clone(), current + 1);
        names.push(name);
    }

    names
}

/// Pick the narrowest type that fits every present value and convert the column.
///
/// Integers need every cell present; a missing cell widens the column to float.
fn infer_column(values: Vec<Option<String>>) -> (ColumnType, Vec<Cell>) {
    let present = || values.iter().flatten();
    let complete = values.iter().all(Option::is_some);

    if complete && present().next().is_some() && present().all(|v| v.trim().parse::<i64>().is_ok())
    {
        let cells = values
            .iter()
            .map(|v| match v {
                Some(s) => s.trim().parse().map(Cell::Integer).unwrap_or(Cell::Missing),
                None => Cell::Missing,
            })
            .collect();
        return (ColumnType::Integer, cells);
    }

    if present().all(|v| v.trim().parse::<f64>().is_ok()) {
        let cells = values
            .iter()
            .map(|v| match v {
                Some(s) => s.trim().parse().map(Cell::Float).unwrap_or(Cell::Missing),
                None => Cell::Missing,
            })
            .collect();
        return (ColumnType::Float, cells);
    }

    let cells = values
        .into_iter()
        .map(|v| v.map(Cell::Text).unwrap_or(Cell::Missing))
        .collect();
    (ColumnType::Text, cells)
}
