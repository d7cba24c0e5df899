use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while loading and querying a sales export.
#[derive(Error, Debug)]
pub enum SalesError {
    /// The export file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tab-separated body could not be tokenised.
    #[error("Failed to parse export: {0}")]
    Csv(#[from] csv::Error),

    /// The export contained no header rows at all.
    #[error("Export is empty")]
    EmptyInput,

    /// A header column carries neither an outer nor an inner label, or the
    /// header is too short to hold the identifying columns.
    #[error("Malformed header at column {column}")]
    MalformedHeader { column: usize },

    /// A data row does not have one value per measure column.
    #[error("Row {row} has {found} measure values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// The aggregate total column is missing, so the export format has changed.
    #[error("Missing total column: {0}")]
    MissingTotalColumn(String),

    /// A customer group was requested that does not appear in the table.
    #[error("Customer group '{0}' not found")]
    UnknownGroup(String),

    /// A measure column was requested that does not appear in the table.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Growth was requested against a current period with zero units.
    #[error("Cannot compute growth: current period total is zero")]
    ZeroCurrentPeriod,

    /// A JSON document could not be parsed or written.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the sales crates.
pub type Result<T> = std::result::Result<T, SalesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = SalesError::FileRead {
            path: PathBuf::from("/data/sales.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/data/sales.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_missing_total_column() {
        let err = SalesError::MissingTotalColumn("Grand Total_Total".to_string());
        assert_eq!(err.to_string(), "Missing total column: Grand Total_Total");
    }

    #[test]
    fn test_error_display_malformed_header() {
        let err = SalesError::MalformedHeader { column: 4 };
        assert_eq!(err.to_string(), "Malformed header at column 4");
    }

    #[test]
    fn test_error_display_unknown_group() {
        let err = SalesError::UnknownGroup("Sprouts".to_string());
        assert_eq!(err.to_string(), "Customer group 'Sprouts' not found");
    }

    #[test]
    fn test_error_display_ragged_row() {
        let err = SalesError::RaggedRow {
            row: 2,
            expected: 12,
            found: 11,
        };
        assert_eq!(err.to_string(), "Row 2 has 11 measure values, expected 12");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SalesError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: SalesError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
