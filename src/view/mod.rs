//! # Workbook and Sheet Views
//!
//! [`WorkbookView`] and [`SheetView`] are stateless handles on a spreadsheet file.
//! Every query re-reads the file, so answers always reflect its current state.
//!
//! String keys resolve to either an intrinsic attribute of the workbook view or a
//! sheet, through [`resolve_key`]. Two access notations exist:
//!
//! - [`Access::Dotted`] accepts both kinds and refuses keys that are both.
//! - [`Access::Indexed`] only ever yields sheets and refuses attribute names.
use crate::error::WorkbookError;

mod sheet;
mod workbook;

pub use sheet::SheetView;
pub use workbook::{Resolved, WorkbookView};

/// Intrinsic attributes of a workbook view.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Intrinsic {
    /// The workbook file path
    Path,
    /// The ordered sheet names
    Sheets,
}

impl Intrinsic {
    /// Every intrinsic attribute, in declaration order.
    pub const ALL: [Intrinsic; 2] = [Intrinsic::Path, Intrinsic::Sheets];

    /// Attribute name as used in keys.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Sheets => "sheets",
        }
    }

    /// Looks up an intrinsic attribute by exact name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|intrinsic| intrinsic.as_str() == name)
    }
}

/// How a key was written by the caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    /// `workbook.key`: attributes and sheets
    Dotted,
    /// `workbook[key]`: sheets only
    Indexed,
}

/// What a key resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Intrinsic(Intrinsic),
    SheetRef(String),
}

/// Resolves `key` against the intrinsic attribute names and `sheet_names`.
///
/// `container` only feeds the `NotFound` message.
pub fn resolve_key(
    key: &str,
    sheet_names: &[String],
    access: Access,
    container: &str,
) -> Result<Resolution, WorkbookError> {
    let intrinsic = Intrinsic::parse(key);
    let is_sheet = sheet_names.iter().any(|name| name == key);
    match (access, intrinsic, is_sheet) {
        (Access::Indexed, Some(_), _) => Err(WorkbookError::AttributeNotItem(key.to_owned())),
        (Access::Dotted, Some(_), true) => Err(WorkbookError::NameConflict(key.to_owned())),
        (Access::Dotted, Some(intrinsic), false) => Ok(Resolution::Intrinsic(intrinsic)),
        (_, None, true) => Ok(Resolution::SheetRef(key.to_owned())),
        (_, None, false) => Err(WorkbookError::NotFound {
            name: key.to_owned(),
            container: container.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn dotted_access_resolves_both_kinds() {
        let sheets = names(&["Summary", "Detail"]);
        assert_eq!(
            resolve_key("path", &sheets, Access::Dotted, "report.xlsx").unwrap(),
            Resolution::Intrinsic(Intrinsic::Path)
        );
        assert_eq!(
            resolve_key("Detail", &sheets, Access::Dotted, "report.xlsx").unwrap(),
            Resolution::SheetRef("Detail".to_owned())
        );
    }

    #[test]
    fn dotted_access_refuses_ambiguous_keys() {
        let sheets = names(&["sheets", "Detail"]);
        let error = resolve_key("sheets", &sheets, Access::Dotted, "report.xlsx").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NameConflict);
    }

    #[test]
    fn indexed_access_refuses_attribute_names() {
        let error = resolve_key("path", &names(&["Detail"]), Access::Indexed, "report.xlsx")
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::AttributeNotItem);

        // Even when a sheet carries the name, indexed access points at dotted access.
        let error = resolve_key("path", &names(&["path"]), Access::Indexed, "report.xlsx")
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::AttributeNotItem);
    }

    #[test]
    fn unknown_keys_are_not_found() {
        for access in [Access::Dotted, Access::Indexed] {
            let error = resolve_key("Missing", &names(&["Detail"]), access, "report.xlsx")
                .unwrap_err();
            assert_eq!(error.kind(), ErrorKind::NotFound);
        }
    }

    #[test]
    fn matching_is_case_sensitive() {
        let error = resolve_key("Path", &names(&["Detail"]), Access::Dotted, "report.xlsx")
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }
}
