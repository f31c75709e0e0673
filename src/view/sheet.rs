use crate::error::{ResultMessage, WorkbookError};
use crate::export::csv::{write_csv, CsvOptions};
use crate::spreadsheet::{self, Table};
use crate::view::WorkbookView;
use calamine::Data;
use log::debug;
use std::path::PathBuf;

/// View of one named sheet of a workbook.
///
/// The sheet's existence is checked once, at construction. Every query below
/// reads the sheet from disk again; use [`SheetView::table`] to keep a snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetView {
    workbook: WorkbookView,
    name: String,
}

impl SheetView {
    /// Creates a view on sheet `name`, failing with `NotFound` if the workbook
    /// currently has no such sheet.
    pub fn new(workbook: WorkbookView, name: &str) -> Result<Self, WorkbookError> {
        if !workbook.contains(name)? {
            return Err(WorkbookError::NotFound {
                name: name.to_owned(),
                container: workbook.path().display().to_string(),
            });
        }
        Ok(Self::bound(workbook, name.to_owned()))
    }

    /// Binds a view to a sheet name already checked against the workbook.
    pub(super) fn bound(workbook: WorkbookView, name: String) -> Self {
        Self { workbook, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn workbook(&self) -> &WorkbookView {
        &self.workbook
    }

    /// Reads the sheet now and returns its data.
    pub fn table(&self) -> Result<Table, WorkbookError> {
        spreadsheet::read_sheet(self.workbook.path(), &self.name)
            .map_err(WorkbookError::from)
            .with_prefix(&format!("Read sheet '{}' failed", self.name))
    }

    /// Column headers in sheet order.
    pub fn columns(&self) -> Result<Vec<String>, WorkbookError> {
        Ok(self.table()?.columns().to_vec())
    }

    /// Number of data rows, header excluded.
    pub fn record_count(&self) -> Result<usize, WorkbookError> {
        Ok(self.table()?.record_count())
    }

    /// Returns true if the sheet has a column called `column`.
    pub fn contains(&self, column: &str) -> Result<bool, WorkbookError> {
        Ok(self.table()?.contains(column))
    }

    /// Count of non-null values in `column`.
    pub fn column_row_count(&self, column: &str) -> Result<usize, WorkbookError> {
        self.table()?.column_row_count(column)
    }

    /// Distinct values of `column` in first-occurrence order.
    pub fn column_unique_vals(&self, column: &str) -> Result<Vec<Data>, WorkbookError> {
        self.table()?.column_unique_vals(column)
    }

    /// Path `save_to_csv` writes to: `<workbook stem>-<sheet name>.csv`, next to the workbook.
    pub fn csv_path(&self) -> PathBuf {
        let path = self.workbook.path();
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        path.with_file_name(format!("{}-{}.csv", stem, self.name))
    }

    /// Writes the sheet's current data to [`SheetView::csv_path`], replacing any
    /// existing file, and returns that path.
    pub fn save_to_csv(&self) -> Result<PathBuf, WorkbookError> {
        let table = self.table()?;
        let destination = self.csv_path();
        debug!("Saving sheet '{}' to '{}'", self.name, destination.display());
        write_csv(&table, &destination, &CsvOptions::default())?;
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::export::xlsx::write_xlsx;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;

    fn text(value: &str) -> Data {
        Data::String(value.to_owned())
    }

    fn write_report(path: &Path) {
        let summary = Table::new(
            "Summary",
            vec!["A".to_owned(), "B".to_owned()],
            vec![
                vec![Data::Int(1), Data::Int(2)],
                vec![Data::Int(3), Data::Int(4)],
            ],
        );
        let detail = Table::new(
            "Detail",
            vec!["Item".to_owned(), "Qty".to_owned()],
            vec![
                vec![text("bolt"), Data::Int(10)],
                vec![text("nut"), Data::Empty],
                vec![text("bolt"), Data::Int(7)],
            ],
        );
        write_xlsx(&[summary, detail], path).unwrap();
    }

    #[test]
    fn construction_checks_sheet_membership() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        write_report(&path);
        let workbook = WorkbookView::new(&path);

        for name in workbook.sheets().unwrap() {
            assert!(SheetView::new(workbook.clone(), &name).is_ok());
        }
        let error = SheetView::new(workbook, "Missing").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn column_queries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        write_report(&path);
        let detail = WorkbookView::new(&path).sheet("Detail").unwrap();

        assert_eq!(detail.columns().unwrap(), vec!["Item", "Qty"]);
        assert_eq!(detail.record_count().unwrap(), 3);
        assert!(detail.contains("Qty").unwrap());
        assert!(!detail.contains("Price").unwrap());
        assert_eq!(detail.column_row_count("Qty").unwrap(), 2);
        assert_eq!(detail.column_row_count("Item").unwrap(), 3);
        assert_eq!(
            detail.column_unique_vals("Item").unwrap(),
            vec![text("bolt"), text("nut")]
        );
        assert_eq!(
            detail.column_row_count("Price").unwrap_err().kind(),
            ErrorKind::ColumnNotFound
        );
        assert_eq!(
            detail.column_unique_vals("Price").unwrap_err().kind(),
            ErrorKind::ColumnNotFound
        );
    }

    #[test]
    fn queries_re_read_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        write_report(&path);
        let summary = WorkbookView::new(&path).sheet("Summary").unwrap();
        assert_eq!(summary.record_count().unwrap(), 2);

        let grown = Table::new(
            "Summary",
            vec!["A".to_owned(), "B".to_owned()],
            vec![
                vec![Data::Int(1), Data::Int(2)],
                vec![Data::Int(3), Data::Int(4)],
                vec![Data::Int(5), Data::Int(6)],
            ],
        );
        write_xlsx(&[grown], &path).unwrap();
        assert_eq!(summary.record_count().unwrap(), 3);
    }

    #[test]
    fn saves_csv_next_to_workbook() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        write_report(&path);
        let summary = WorkbookView::new(&path).sheet("Summary").unwrap();

        let destination = summary.save_to_csv().unwrap();
        assert_eq!(destination, dir.path().join("report-Summary.csv"));

        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&destination)
            .unwrap();
        let records: Vec<Vec<String>> = reader
            .records()
            .map(|record| record.unwrap().iter().map(str::to_owned).collect())
            .collect();
        assert_eq!(records, vec![vec!["A", "B"], vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn save_fails_when_directory_is_gone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        write_report(&path);
        let summary = WorkbookView::new(&path).sheet("Summary").unwrap();
        let table = summary.table().unwrap();

        drop(dir);
        assert_eq!(summary.save_to_csv().unwrap_err().kind(), ErrorKind::Io);
        assert_eq!(table.record_count(), 2);
    }
}
