use crate::error::WorkbookError;
use crate::spreadsheet::cell::{is_null, to_text, CellKey};
use calamine::{Data, Range};
use std::collections::HashSet;

/// Rows × columns snapshot of one sheet or query result.
///
/// A `Table` never goes back to its source. Holding one is the explicit way to
/// query the same data several times without re-reading; take a new one to see
/// later changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    /// Sheet or table name the data came from
    name: String,
    /// Column headers in source order, duplicates kept
    columns: Vec<String>,
    /// Data rows, header excluded, each exactly `columns.len()` wide
    rows: Vec<Vec<Data>>,
}

impl Table {
    /// Creates a table, padding short rows with empty cells and cutting long ones.
    pub fn new(name: &str, columns: Vec<String>, rows: Vec<Vec<Data>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Data::Empty);
                row
            })
            .collect();
        Self {
            name: name.to_owned(),
            columns,
            rows,
        }
    }

    /// Builds a table from a used cell range whose first row is the header.
    ///
    /// Columns left of the used range are kept as empty columns, so positions match
    /// the sheet from column A. Missing header cells are named `column{n}` with a
    /// 1-based sheet position.
    pub fn from_range(name: &str, range: &Range<Data>) -> Self {
        let offset = range.start().map_or(0, |(_, col)| col as usize);
        let mut rows = range.rows();
        let columns = match rows.next() {
            Some(header) => std::iter::repeat(&Data::Empty)
                .take(offset)
                .chain(header)
                .enumerate()
                .map(|(index, cell)| {
                    if is_null(cell) {
                        format!("column{}", index + 1)
                    } else {
                        to_text(cell)
                    }
                })
                .collect(),
            None => Vec::new(),
        };
        let rows = rows
            .map(|row| {
                let mut cells = vec![Data::Empty; offset];
                cells.extend_from_slice(row);
                cells
            })
            .collect();
        Self::new(name, columns, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the same data under another name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Data>] {
        &self.rows
    }

    /// Number of data rows, header excluded.
    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if `column` is one of the headers.
    pub fn contains(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Position of the first header equal to `column`.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    /// Returns the position of `column`, or `ColumnNotFound`.
    ///
    /// Every column-taking query calls this first.
    pub fn require_column(&self, column: &str) -> Result<usize, WorkbookError> {
        self.column_index(column)
            .ok_or_else(|| WorkbookError::ColumnNotFound {
                sheet: self.name.to_owned(),
                column: column.to_owned(),
            })
    }

    /// Iterates the cells of the column at `index`.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Data> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Count of non-null values in `column`.
    pub fn column_row_count(&self, column: &str) -> Result<usize, WorkbookError> {
        let index = self.require_column(column)?;
        Ok(self.column_values(index).filter(|cell| !is_null(cell)).count())
    }

    /// Distinct values of `column` in first-occurrence order.
    ///
    /// Null counts as a value, so the result length equals `record_count` exactly
    /// when every cell in the column is distinct.
    pub fn column_unique_vals(&self, column: &str) -> Result<Vec<Data>, WorkbookError> {
        let index = self.require_column(column)?;
        let mut seen = HashSet::new();
        Ok(self
            .column_values(index)
            .filter(|cell| seen.insert(CellKey::from(*cell)))
            .cloned()
            .collect())
    }

    /// Renders the data rows as text, header excluded.
    pub fn to_text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(to_text).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use calamine::CellErrorType;
    use pretty_assertions::assert_eq;

    fn text(value: &str) -> Data {
        Data::String(value.to_owned())
    }

    fn sample() -> Table {
        Table::new(
            "Detail",
            vec!["Item".to_owned(), "Qty".to_owned()],
            vec![
                vec![text("bolt"), Data::Float(3.0)],
                vec![text("nut"), Data::Empty],
                vec![text("bolt"), Data::Float(5.0)],
                vec![text("washer")],
            ],
        )
    }

    #[test]
    fn pads_short_rows() {
        let table = sample();
        assert_eq!(table.record_count(), 4);
        assert_eq!(table.rows()[3], vec![text("washer"), Data::Empty]);
    }

    #[test]
    fn counts_non_null_values() {
        let table = sample();
        assert_eq!(table.column_row_count("Item").unwrap(), 4);
        assert_eq!(table.column_row_count("Qty").unwrap(), 2);

        let table = Table::new(
            "Rates",
            vec!["Rate".to_owned()],
            vec![
                vec![Data::Float(1.0)],
                vec![Data::Error(CellErrorType::NA)],
                vec![Data::Empty],
            ],
        );
        assert_eq!(table.column_row_count("Rate").unwrap(), 1);
        assert_eq!(
            table.column_unique_vals("Rate").unwrap(),
            vec![Data::Float(1.0), Data::Error(CellErrorType::NA)]
        );
    }

    #[test]
    fn unique_values_keep_first_occurrence_order() {
        let table = sample();
        assert_eq!(
            table.column_unique_vals("Item").unwrap(),
            vec![text("bolt"), text("nut"), text("washer")]
        );
        assert_eq!(
            table.column_unique_vals("Qty").unwrap(),
            vec![Data::Float(3.0), Data::Empty, Data::Float(5.0)]
        );
    }

    #[test]
    fn unique_and_non_null_counts_are_bounded_by_record_count() {
        let table = sample();
        for column in table.columns() {
            assert!(table.column_unique_vals(column).unwrap().len() <= table.record_count());
            assert!(table.column_row_count(column).unwrap() <= table.record_count());
        }
    }

    #[test]
    fn unique_count_equals_record_count_only_when_all_distinct() {
        let table = Table::new(
            "Detail",
            vec!["Code".to_owned(), "Item".to_owned()],
            vec![
                vec![text("A1"), text("bolt")],
                vec![text("B2"), text("nut")],
                vec![text("C3"), text("bolt")],
            ],
        );
        assert_eq!(table.column_unique_vals("Code").unwrap().len(), table.record_count());
        assert_ne!(table.column_unique_vals("Item").unwrap().len(), table.record_count());
        assert_eq!(table.column_unique_vals("Item").unwrap().len(), 2);
    }

    #[test]
    fn unknown_column_is_rejected() {
        let table = sample();
        assert!(!table.contains("Price"));
        let error = table.column_row_count("Price").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ColumnNotFound);
        let error = table.column_unique_vals("Price").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ColumnNotFound);
    }

    #[test]
    fn header_comes_from_first_row() {
        let mut range = Range::new((0, 0), (2, 2));
        range.set_value((0, 0), text("A"));
        range.set_value((0, 2), text("C"));
        range.set_value((1, 0), Data::Float(1.0));
        range.set_value((2, 1), Data::Float(2.0));
        let table = Table::from_range("Sheet1", &range);

        assert_eq!(table.columns(), ["A", "column2", "C"]);
        assert_eq!(table.record_count(), 2);
        assert_eq!(
            table.to_text_rows(),
            vec![vec!["1", "", ""], vec!["", "2", ""]]
        );
    }

    #[test]
    fn leading_empty_columns_are_kept() {
        let mut range = Range::new((0, 2), (1, 3));
        range.set_value((0, 2), text("A"));
        range.set_value((0, 3), text("B"));
        range.set_value((1, 2), Data::Float(1.0));
        range.set_value((1, 3), Data::Float(2.0));
        let table = Table::from_range("Offset", &range);

        assert_eq!(table.columns(), ["column1", "column2", "A", "B"]);
        assert_eq!(table.to_text_rows(), vec![vec!["", "", "1", "2"]]);
        assert_eq!(table.column_row_count("column1").unwrap(), 0);
    }

    #[test]
    fn empty_range_gives_empty_table() {
        let range: Range<Data> = Range::empty();
        let table = Table::from_range("Blank", &range);
        assert!(table.columns().is_empty());
        assert_eq!(table.record_count(), 0);
    }
}
