use crate::error::{ResultMessage, WorkbookError};
use crate::spreadsheet;
use crate::view::{resolve_key, Access, Intrinsic, Resolution, SheetView};
use std::path::{Path, PathBuf};

/// Read-only view of a spreadsheet file.
///
/// Holds only the path. Sheet names are fetched from the file on every call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkbookView {
    path: PathBuf,
}

/// Value of a resolved key.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved {
    /// The `path` attribute
    Path(PathBuf),
    /// The `sheets` attribute
    Sheets(Vec<String>),
    /// A sheet of this workbook
    Sheet(SheetView),
}

impl WorkbookView {
    /// Creates a view on the file at `path`. The file is not touched.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sheet names in workbook order, read from the file now.
    pub fn sheets(&self) -> Result<Vec<String>, WorkbookError> {
        spreadsheet::list_sheets(&self.path)
            .map_err(WorkbookError::from)
            .with_prefix(&format!("Read sheet names of '{}' failed", self.path.display()))
    }

    /// Returns true if the file currently has a sheet called `name`.
    pub fn contains(&self, name: &str) -> Result<bool, WorkbookError> {
        Ok(self.sheets()?.iter().any(|sheet| sheet == name))
    }

    /// Opens the sheet `name`, failing with `NotFound` if the file has no such sheet.
    pub fn sheet(&self, name: &str) -> Result<SheetView, WorkbookError> {
        SheetView::new(self.clone(), name)
    }

    /// Dotted access: resolves `key` to an attribute value or a sheet.
    pub fn attr(&self, key: &str) -> Result<Resolved, WorkbookError> {
        self.resolve(key, Access::Dotted)
    }

    /// Indexed access: resolves `key` to a sheet, refusing attribute names.
    pub fn item(&self, key: &str) -> Result<SheetView, WorkbookError> {
        match self.resolve(key, Access::Indexed)? {
            Resolved::Sheet(sheet) => Ok(sheet),
            // Indexed resolution never yields an attribute.
            _ => Err(WorkbookError::AttributeNotItem(key.to_owned())),
        }
    }

    /// Resolves `key` with the rules of `access` against the current sheet names.
    pub fn resolve(&self, key: &str, access: Access) -> Result<Resolved, WorkbookError> {
        let sheets = self.sheets()?;
        let container = self.path.display().to_string();
        match resolve_key(key, &sheets, access, &container)? {
            Resolution::Intrinsic(Intrinsic::Path) => Ok(Resolved::Path(self.path.clone())),
            Resolution::Intrinsic(Intrinsic::Sheets) => Ok(Resolved::Sheets(sheets)),
            Resolution::SheetRef(name) => Ok(Resolved::Sheet(SheetView::bound(self.clone(), name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::export::xlsx::write_xlsx;
    use crate::spreadsheet::Table;
    use calamine::Data;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_workbook(path: &Path, sheet_names: &[&str]) {
        let tables: Vec<Table> = sheet_names
            .iter()
            .map(|name| {
                Table::new(
                    name,
                    vec!["Qty".to_owned()],
                    vec![vec![Data::Float(1.0)]],
                )
            })
            .collect();
        write_xlsx(&tables, path).unwrap();
    }

    #[test]
    fn lists_sheets_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        write_workbook(&path, &["Summary", "Detail"]);

        let workbook = WorkbookView::new(&path);
        assert_eq!(workbook.sheets().unwrap(), vec!["Summary", "Detail"]);
        assert!(workbook.contains("Detail").unwrap());
        assert!(!workbook.contains("Missing").unwrap());
    }

    #[test]
    fn sees_external_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        write_workbook(&path, &["Summary"]);
        let workbook = WorkbookView::new(&path);
        assert!(!workbook.contains("Detail").unwrap());

        write_workbook(&path, &["Summary", "Detail"]);
        assert!(workbook.contains("Detail").unwrap());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let workbook = WorkbookView::new(dir.path().join("absent.xlsx"));
        assert_eq!(workbook.sheets().unwrap_err().kind(), ErrorKind::Io);
        assert_eq!(workbook.contains("Detail").unwrap_err().kind(), ErrorKind::Io);
    }

    #[test]
    fn dotted_and_indexed_access() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        write_workbook(&path, &["Summary", "Detail"]);
        let workbook = WorkbookView::new(&path);

        assert_eq!(workbook.attr("path").unwrap(), Resolved::Path(path.clone()));
        assert_eq!(
            workbook.attr("sheets").unwrap(),
            Resolved::Sheets(vec!["Summary".to_owned(), "Detail".to_owned()])
        );
        match workbook.attr("Detail").unwrap() {
            Resolved::Sheet(sheet) => assert_eq!(sheet.name(), "Detail"),
            other => panic!("expected a sheet, got {other:?}"),
        }
        assert_eq!(workbook.item("Summary").unwrap().name(), "Summary");
        assert_eq!(workbook.item("sheets").unwrap_err().kind(), ErrorKind::AttributeNotItem);
        assert_eq!(workbook.attr("Missing").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(workbook.item("Missing").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn sheet_named_like_an_attribute_conflicts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        write_workbook(&path, &["path", "Detail"]);
        let workbook = WorkbookView::new(&path);

        assert_eq!(workbook.attr("path").unwrap_err().kind(), ErrorKind::NameConflict);
        // Explicit construction is not dynamic access and still reaches the sheet.
        assert_eq!(workbook.sheet("path").unwrap().name(), "path");
    }
}
