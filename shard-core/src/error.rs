//! Error types for shard-core.

use thiserror::Error;

/// Result type alias for shard-core operations.
pub type Result<T> = std::result::Result<T, ShardError>;

/// A graph node whose identifier is neither text nor an integer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Node {node} has an invalid identifier type.")]
pub struct ValidationError {
    /// Display form of the offending node value.
    pub node: String,
}

/// Errors that can occur while turning a CSV upload into a rendered graph.
#[derive(Error, Debug)]
pub enum ShardError {
    /// The CSV input could not be parsed into a dataset.
    #[error("{message}")]
    CsvRead {
        /// Reason reported by the reader.
        message: String,
    },

    /// A requested column does not exist in the dataset.
    #[error("Column not found: {name}")]
    ColumnNotFound {
        /// Column name that was requested.
        name: String,
    },

    /// A node failed identifier validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The render target rejected an operation or a template failed.
    #[error("Render error: {message}")]
    Render {
        /// Description of the render failure.
        message: String,
    },

    /// IO error reading the CSV file.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl ShardError {
    /// Whether this error came from reading or parsing the CSV input.
    pub fn is_read_error(&self) -> bool {
        matches!(self, ShardError::CsvRead { .. } | ShardError::Io(_))
    }
}

impl From<csv::Error> for ShardError {
    fn from(err: csv::Error) -> Self {
        ShardError::CsvRead {
            message: err.to_string(),
        }
    }
}

impl From<minijinja::Error> for ShardError {
    fn from(err: minijinja::Error) -> Self {
        ShardError::Render {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ValidationError {
            node: "1.5".to_string(),
        };
        assert_eq!(err.to_string(), "Node 1.5 has an invalid identifier type.");

        let err: ShardError = err.into();
        assert!(err.to_string().contains("1.5"));
        assert!(!err.is_read_error());

        let err = ShardError::ColumnNotFound {
            name: "weight".to_string(),
        };
        assert_eq!(err.to_string(), "Column not found: weight");
    }

    #[test]
    fn test_read_errors() {
        let err = ShardError::CsvRead {
            message: "No columns to parse from file".to_string(),
        };
        assert!(err.is_read_error());
        assert_eq!(err.to_string(), "No columns to parse from file");

        let err: ShardError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.is_read_error());
    }
}
