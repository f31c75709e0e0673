//! CSV writer

use crate::error::WorkbookError;
use crate::spreadsheet::cell::to_text;
use crate::spreadsheet::Table;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Options for CSV output.
#[derive(Copy, Clone, Debug)]
pub struct CsvOptions {
    /// Field delimiter
    pub delimiter: u8,
    /// Whether to write the header row
    pub header: bool,
}

impl Default for CsvOptions {
    /// Comma-delimited with a header row.
    fn default() -> Self {
        Self {
            delimiter: b',',
            header: true,
        }
    }
}

/// Writes a table to a CSV file, replacing any existing file. No index column is written.
pub fn write_csv<P: AsRef<Path>>(
    table: &Table,
    path: P,
    options: &CsvOptions,
) -> Result<(), WorkbookError> {
    let file = File::create(path)?;
    write_csv_to(table, file, options)
}

/// Writes a table as CSV to any writer.
pub fn write_csv_to<W: Write>(
    table: &Table,
    writer: W,
    options: &CsvOptions,
) -> Result<(), WorkbookError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(writer);

    if options.header {
        csv_writer.write_record(table.columns())?;
    }
    for row in table.rows() {
        csv_writer.write_record(row.iter().map(to_text))?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;
    use pretty_assertions::assert_eq;

    fn render(table: &Table, options: &CsvOptions) -> String {
        let mut buffer = Vec::new();
        write_csv_to(table, &mut buffer, options).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn writes_header_and_rows() {
        let table = Table::new(
            "Sheet1",
            vec!["A".to_owned(), "B".to_owned()],
            vec![
                vec![Data::Float(1.0), Data::Float(2.0)],
                vec![Data::Float(3.0), Data::Float(4.0)],
            ],
        );
        assert_eq!(render(&table, &CsvOptions::default()), "A,B\n1,2\n3,4\n");
    }

    #[test]
    fn quotes_and_nulls() {
        let table = Table::new(
            "Sheet1",
            vec!["Name".to_owned(), "Note".to_owned()],
            vec![vec![Data::String("Smith, J".to_owned()), Data::Empty]],
        );
        assert_eq!(
            render(&table, &CsvOptions::default()),
            "Name,Note\n\"Smith, J\",\n"
        );
    }

    #[test]
    fn honours_options() {
        let table = Table::new(
            "Sheet1",
            vec!["A".to_owned(), "B".to_owned()],
            vec![vec![Data::Bool(true), Data::Int(7)]],
        );
        let options = CsvOptions {
            delimiter: b';',
            header: false,
        };
        assert_eq!(render(&table, &options), "true;7\n");
    }
}
