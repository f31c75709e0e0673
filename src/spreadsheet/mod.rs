//! # Spreadsheet Reading Module
//!
//! This module opens Excel (.xlsx, .xlsm, .xlam, .xlsb, .xls, .xla) and OpenDocument
//! (.ods) files through calamine and turns a named sheet into a [`Table`]. Every call
//! goes back to the file: nothing read here is cached.
use crate::spreadsheet::SpreadsheetError::InvalidFileFormat;
use calamine::{
    open_workbook, Data, Ods, OdsError, Range, Reader, Xls, XlsError, Xlsb, XlsbError, Xlsx,
    XlsxError,
};
use log::debug;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

pub(crate) mod cell;
pub(crate) mod reference;
pub mod table;

pub use table::Table;

/// Custom error types for spreadsheet operations.
///
/// Opening a missing or unreadable file surfaces as one of the format variants,
/// since calamine reports I/O failures through its per-format error types.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// Error in Excel 2007+ format (.xlsx, .xlsm, .xlam)
    #[error("Invalid xlsx file format: {0}")]
    InvalidXlsxFileFormat(#[from] XlsxError),

    /// Error in Excel Binary format (.xlsb)
    #[error("Invalid xlsb file format: {0}")]
    InvalidXlsbFileFormat(#[from] XlsbError),

    /// Error in legacy Excel format (.xls, .xla)
    #[error("Invalid xls file format: {0}")]
    InvalidXlsFileFormat(#[from] XlsError),

    /// Error in OpenDocument format (.ods)
    #[error("Invalid ods file format: {0}")]
    InvalidOdsFileFormat(#[from] OdsError),

    /// Unsupported or unrecognized file format
    #[error("Cannot detect file format for '{name}'")]
    InvalidFileFormat { name: String },
}

/// Type alias for buffered file reader
pub type FileReader = BufReader<File>;

/// Wrapper enum for different spreadsheet format readers.
///
/// This enum provides a unified interface over the various spreadsheet
/// formats supported by the calamine library, abstracting away the
/// differences between formats.
pub enum Spreadsheet {
    /// Excel 2007+ format reader (.xlsx, .xlsm, .xlam)
    Xlsx(Xlsx<FileReader>),
    /// Excel Binary format reader (.xlsb)
    Xlsb(Xlsb<FileReader>),
    /// Legacy Excel format reader (.xls, .xla)
    Xls(Xls<FileReader>),
    /// OpenDocument format reader (.ods)
    Ods(Ods<FileReader>),
}

impl Spreadsheet {
    /// Opens a spreadsheet file read-only and returns the appropriate reader.
    ///
    /// The format is chosen from the file extension (case-insensitive):
    /// - `.xlsx`, `.xlsm`, `.xlam` - Excel 2007+ format
    /// - `.xlsb` - Excel Binary format
    /// - `.xls`, `.xla` - Legacy Excel format
    /// - `.ods` - OpenDocument format
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file format is not supported
    /// - The file cannot be opened or read
    /// - The file is corrupted or invalid
    pub fn open<P>(path: P) -> Result<Spreadsheet, SpreadsheetError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        debug!("Opening spreadsheet '{}'", path.display());
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") | Some("xlam") => Ok(Self::Xlsx(open_workbook(path)?)),
            Some("xlsb") => Ok(Self::Xlsb(open_workbook(path)?)),
            Some("xls") | Some("xla") => Ok(Self::Xls(open_workbook(path)?)),
            Some("ods") => Ok(Self::Ods(open_workbook(path)?)),
            _ => Err(InvalidFileFormat {
                name: path.to_string_lossy().to_string(),
            }),
        }
    }

    /// Returns the names of all sheets in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        match self {
            Self::Xlsx(xlsx) => xlsx.sheet_names(),
            Self::Xlsb(xlsb) => xlsb.sheet_names(),
            Self::Xls(xls) => xls.sheet_names(),
            Self::Ods(ods) => ods.sheet_names(),
        }
    }

    /// Reads the used cell range of a sheet.
    pub fn read_range(&mut self, sheet_name: &str) -> Result<Range<Data>, SpreadsheetError> {
        let range = match self {
            Self::Xlsx(xlsx) => xlsx.worksheet_range(sheet_name)?,
            Self::Xlsb(xlsb) => xlsb.worksheet_range(sheet_name)?,
            Self::Xls(xls) => xls.worksheet_range(sheet_name)?,
            Self::Ods(ods) => ods.worksheet_range(sheet_name)?,
        };
        Ok(range)
    }

    /// Reads a sheet as a table whose first used row is the header.
    pub fn read_table(&mut self, sheet_name: &str) -> Result<Table, SpreadsheetError> {
        let range = self.read_range(sheet_name)?;
        debug!(
            "Read sheet '{}' with {} rows and {} columns",
            sheet_name,
            range.height(),
            range.width()
        );
        Ok(Table::from_range(sheet_name, &range))
    }
}

/// Lists the sheet names of the workbook at `path`.
pub fn list_sheets<P: AsRef<Path>>(path: P) -> Result<Vec<String>, SpreadsheetError> {
    Ok(Spreadsheet::open(path)?.sheet_names())
}

/// Reads one sheet of the workbook at `path`.
pub fn read_sheet<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<Table, SpreadsheetError> {
    Spreadsheet::open(path)?.read_table(sheet_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_extension() {
        let result = Spreadsheet::open("report.txt");
        assert!(matches!(result, Err(InvalidFileFormat { .. })));
    }

    #[test]
    fn missing_file_fails() {
        let result = Spreadsheet::open("non_existent_file.xlsx");
        assert!(matches!(result, Err(SpreadsheetError::InvalidXlsxFileFormat(_))));
    }
}
