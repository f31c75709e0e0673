//! # Rusty Workbook
//!
//! Read-only, always-fresh views over spreadsheet files, plus the plumbing to move
//! their data to and from a database.
//!
//! ## Features
//!
//! - **Multi-format support**: Read Excel files (`.xls`, `.xlsx`, `.xlsm`, `.xlsb`, `.xla`, `.xlam`)
//!   and OpenDocument spreadsheet files (`.ods`) through calamine
//! - **Stateless views**: [`WorkbookView`] and [`SheetView`] hold only a path and a sheet name;
//!   every query reads the file again, so answers follow the file as it changes
//! - **Key resolution**: dotted and indexed access to sheets and workbook attributes, with
//!   ambiguous keys refused rather than guessed
//! - **Snapshots**: [`Table`] is the explicit way to keep data between queries
//! - **Export**: CSV and minimal XLSX writers
//! - **Database transfer**: run SQL against a DuckDB file, download tables to workbooks and
//!   upload sheets as tables with inferred column types
//! - **Form automation**: drive a desktop database application's forms behind a trait, with
//!   guaranteed release of the application
//!
//! The library logs through the `log` facade and never installs a logger.
mod error;

pub mod automation;
pub mod database;
pub mod export;
pub mod spreadsheet;
pub mod view;

pub use automation::{form_fill_run, AutomationError, FormApplication, FormSession};
pub use database::{Database, DatabaseConfig};
pub use error::{ErrorKind, WorkbookError};
pub use export::{write_csv, write_xlsx, CsvOptions};
pub use spreadsheet::{Spreadsheet, SpreadsheetError, Table};
pub use view::{resolve_key, Access, Intrinsic, Resolution, Resolved, SheetView, WorkbookView};
