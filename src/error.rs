use thiserror::Error;

/// Main error type for the workbook wrappers.
/// Aggregates errors from various sources including standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("{message}: {source}")]
    WithContextError {
        message: String,
        #[source]
        source: Box<WorkbookError>,
    },

    // Resolution errors
    #[error("'{name}' not found in '{container}'")]
    NotFound { name: String, container: String },

    #[error("'{0}' is both an attribute and a sheet name")]
    NameConflict(String),

    #[error("'{0}' is an attribute, not a sheet; use dotted access instead")]
    AttributeNotItem(String),

    #[error("Column '{column}' not found in sheet '{sheet}'")]
    ColumnNotFound { sheet: String, column: String },

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    // Third-party library errors
    #[error("{0}")]
    DuckDBError(#[from] duckdb::Error),

    #[error("{0}")]
    CsvError(#[from] csv::Error),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    // Module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    XlsxError(#[from] crate::export::xlsx::XlsxError),

    #[error("{0}")]
    AutomationError(#[from] crate::automation::AutomationError),
}

/// Coarse classification of a [`WorkbookError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A sheet or table does not exist
    NotFound,
    /// Dotted access matched both an attribute and a sheet
    NameConflict,
    /// Indexed access named an attribute
    AttributeNotItem,
    /// A column-taking operation received an unknown column
    ColumnNotFound,
    /// File missing, unreadable, malformed or not writable
    Io,
    /// Database driver failure
    Driver,
    /// Desktop application automation failure
    Automation,
}

impl WorkbookError {
    /// Returns the kind of this error, looking through context wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::WithContextError { source, .. } => source.kind(),
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NameConflict(_) => ErrorKind::NameConflict,
            Self::AttributeNotItem(_) => ErrorKind::AttributeNotItem,
            Self::ColumnNotFound { .. } => ErrorKind::ColumnNotFound,
            Self::IoError(_)
            | Self::CsvError(_)
            | Self::ZipError(_)
            | Self::XmlError(_)
            | Self::SpreadsheetError(_)
            | Self::XlsxError(_) => ErrorKind::Io,
            Self::DuckDBError(_) => ErrorKind::Driver,
            Self::AutomationError(_) => ErrorKind::Automation,
        }
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, WorkbookError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| WorkbookError::WithContextError {
            message: message.to_owned(),
            source: Box::new(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_survives_context() {
        let result: Result<(), WorkbookError> = Err(WorkbookError::NameConflict("path".to_owned()));
        let error = result.with_prefix("Resolve 'path' failed").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NameConflict);
        assert_eq!(
            error.to_string(),
            "Resolve 'path' failed: 'path' is both an attribute and a sheet name"
        );
    }

    #[test]
    fn io_errors_are_io_kind() {
        let error = WorkbookError::from(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert_eq!(error.kind(), ErrorKind::Io);
    }
}
