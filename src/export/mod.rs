//! Writers for tabular data: CSV for sheet exports, XLSX for database downloads.
pub mod csv;
pub mod xlsx;

pub use self::csv::{write_csv, CsvOptions};
pub use self::xlsx::write_xlsx;
