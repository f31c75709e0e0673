//! # Database Module
//!
//! A thin wrapper over a DuckDB database file. Every operation opens its own
//! connection and drops it when done, so a [`Database`] holds nothing but its
//! configuration.
//!
//! Query results come back as [`Table`]s, the same snapshot type sheets are read
//! into, which lets a database table be written straight to a workbook and a sheet
//! be uploaded straight into a table.
use crate::error::{ResultMessage, WorkbookError};
use crate::export::xlsx::write_xlsx;
use crate::spreadsheet::cell::{is_null, to_text};
use crate::spreadsheet::Table;
use crate::view::WorkbookView;
use calamine::Data;
use chrono::{DateTime, NaiveTime};
use duckdb::types::{TimeUnit, Value};
use duckdb::{params_from_iter, AccessMode, Config, Connection};
use log::{debug, warn};
use std::io::Write;
use std::path::Path;

pub mod column;
mod config;

pub use column::{Column, ColumnType};
pub use config::{DatabaseConfig, DEFAULT_MAX_COLUMN_NAME_LENGTH};

const SECONDS_PER_DAY: i64 = 86_400;

/// Handle on a DuckDB database file.
#[derive(Clone, Debug)]
pub struct Database {
    config: DatabaseConfig,
}

impl Database {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Handle on the database at `path` with default settings.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::new(DatabaseConfig::new(path))
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    fn connect(&self) -> Result<Connection, WorkbookError> {
        let path = &self.config.path;
        debug!("Connecting to '{}' (read-only: {})", path.display(), self.config.read_only);
        let connection = if self.config.read_only {
            Config::default()
                .access_mode(AccessMode::ReadOnly)
                .and_then(|config| Connection::open_with_flags(path, config))
        } else {
            Connection::open(path)
        };
        connection
            .map_err(WorkbookError::from)
            .with_prefix(&format!("Open database '{}' failed", path.display()))
    }

    /// Executes one or more statements in a transaction and commits. Any output is discarded.
    pub fn run_sql(&self, sql: &str) -> Result<(), WorkbookError> {
        debug!("Running SQL: {}", sql);
        let mut connection = self.connect()?;
        let transaction = connection.transaction()?;
        transaction.execute_batch(sql)?;
        transaction.commit()?;

        if sql.to_lowercase().contains("select") {
            warn!("run_sql discards query output; use run_select_sql to see the result of a SELECT");
        }
        Ok(())
    }

    /// Executes a query and returns its columns and rows.
    pub fn run_select_sql(&self, sql: &str) -> Result<Table, WorkbookError> {
        debug!("Running query: {}", sql);
        let connection = self.connect()?;
        query_table(&connection, "query", sql)
    }

    /// Executes a query and writes each result row to `writer` as one comma-separated line.
    ///
    /// Returns the number of rows written.
    pub fn print_select_sql<W: Write>(&self, sql: &str, mut writer: W) -> Result<usize, WorkbookError> {
        let table = self.run_select_sql(sql)?;
        for row in table.to_text_rows() {
            writeln!(writer, "{}", row.join(", "))?;
        }
        writer.flush()?;
        Ok(table.record_count())
    }

    /// Invokes the table macro or table function `name` stored in the database, commits,
    /// and returns whatever rows it produced.
    pub fn run_saved_query(&self, name: &str) -> Result<Table, WorkbookError> {
        let sql = format!("CALL {}()", quote_identifier(name));
        debug!("Running saved query: {}", sql);
        let mut connection = self.connect()?;
        let transaction = connection.transaction()?;
        let table = query_table(&transaction, name, &sql)
            .with_prefix(&format!("Run saved query '{}' failed", name))?;
        transaction.commit()?;
        Ok(table)
    }

    /// Writes every row of `table` to a new workbook at `destination`.
    ///
    /// The single sheet is named `sheet`, or after the table when `sheet` is
    /// absent or empty. The header row is unstyled and no index column is added.
    pub fn download_to_excel<P: AsRef<Path>>(
        &self,
        table: &str,
        destination: P,
        sheet: Option<&str>,
    ) -> Result<(), WorkbookError> {
        let sheet = match sheet {
            Some(sheet) if !sheet.is_empty() => sheet,
            _ => table,
        };
        let data = self
            .run_select_sql(&format!("SELECT * FROM {}", quote_identifier(table)))?
            .with_name(sheet);
        debug!(
            "Downloading {} rows of '{}' to '{}'",
            data.record_count(),
            table,
            destination.as_ref().display()
        );
        write_xlsx(&[data], destination)
    }

    /// Creates table `table` from sheet `sheet` of the workbook at `file` and returns
    /// the number of rows inserted.
    pub fn upload_table<P: AsRef<Path>>(
        &self,
        file: P,
        sheet: &str,
        table: &str,
    ) -> Result<usize, WorkbookError> {
        let data = WorkbookView::new(file).sheet(sheet)?.table()?;
        self.insert_table(&data, table)
    }

    /// Creates table `table` with one column per column of `data` and inserts its rows.
    ///
    /// Column names longer than the configured limit are cut to it. Each column takes
    /// the narrowest SQL type that fits all of its non-null cells. Null and error
    /// cells are stored as NULL.
    pub fn insert_table(&self, data: &Table, table: &str) -> Result<usize, WorkbookError> {
        let columns = self.infer_columns(data);
        let definitions = columns
            .iter()
            .map(|column| format!("{} {}", quote_identifier(&column.name), column.kind.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = columns
            .iter()
            .map(|column| match column.kind.is_temporal() {
                true => format!("CAST(? AS {})", column.kind.as_str()),
                false => "?".to_owned(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let create_sql = format!("CREATE TABLE {} ({})", quote_identifier(table), definitions);
        let insert_sql = format!("INSERT INTO {} VALUES ({})", quote_identifier(table), placeholders);
        debug!("Uploading {} rows: {}", data.record_count(), create_sql);

        let mut connection = self.connect()?;
        let transaction = connection.transaction()?;
        transaction.execute_batch(&create_sql)?;
        {
            let mut statement = transaction.prepare(&insert_sql)?;
            for row in data.rows() {
                let values = row
                    .iter()
                    .zip(&columns)
                    .map(|(cell, column)| to_value(cell, column.kind));
                statement.execute(params_from_iter(values))?;
            }
        }
        transaction.commit()?;
        Ok(data.record_count())
    }

    fn infer_columns(&self, data: &Table) -> Vec<Column> {
        let limit = self.config.max_column_name_length;
        data.columns()
            .iter()
            .enumerate()
            .map(|(index, name)| Column {
                name: name.chars().take(limit).collect(),
                kind: ColumnType::detect(data.column_values(index)),
            })
            .collect()
    }
}

/// Quotes an SQL identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn query_table(connection: &Connection, name: &str, sql: &str) -> Result<Table, WorkbookError> {
    let mut statement = connection.prepare(sql)?;
    let mut rows = statement.query([])?;
    let columns = rows
        .as_ref()
        .map(|statement| statement.column_names())
        .unwrap_or_default();

    let mut data = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(columns.len());
        for index in 0..columns.len() {
            cells.push(to_cell(row.get::<_, Value>(index)?));
        }
        data.push(cells);
    }
    debug!("Query returned {} rows", data.len());
    Ok(Table::new(name, columns, data))
}

/// Converts a DuckDB value to a cell. Temporal values become ISO 8601 text.
fn to_cell(value: Value) -> Data {
    match value {
        Value::Null => Data::Empty,
        Value::Boolean(value) => Data::Bool(value),
        Value::TinyInt(value) => Data::Int(value.into()),
        Value::SmallInt(value) => Data::Int(value.into()),
        Value::Int(value) => Data::Int(value.into()),
        Value::BigInt(value) => Data::Int(value),
        Value::UTinyInt(value) => Data::Int(value.into()),
        Value::USmallInt(value) => Data::Int(value.into()),
        Value::UInt(value) => Data::Int(value.into()),
        Value::UBigInt(value) => i64::try_from(value).map_or(Data::Float(value as f64), Data::Int),
        Value::HugeInt(value) => i64::try_from(value).map_or(Data::Float(value as f64), Data::Int),
        Value::Float(value) => Data::Float(value.into()),
        Value::Double(value) => Data::Float(value),
        Value::Decimal(value) => {
            let text = value.to_string();
            text.parse().map_or(Data::String(text), Data::Float)
        }
        Value::Text(value) | Value::Enum(value) => Data::String(value),
        Value::Date32(days) => DateTime::from_timestamp(i64::from(days) * SECONDS_PER_DAY, 0)
            .map_or(Data::Int(days.into()), |date| {
                Data::DateTimeIso(date.date_naive().format("%Y-%m-%d").to_string())
            }),
        Value::Timestamp(unit, value) => DateTime::from_timestamp_micros(to_micros(unit, value))
            .map_or(Data::Int(value), |datetime| {
                Data::DateTimeIso(datetime.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }),
        Value::Time64(unit, value) => {
            let micros = to_micros(unit, value);
            let seconds = micros.div_euclid(1_000_000);
            let nanos = micros.rem_euclid(1_000_000) * 1_000;
            u32::try_from(seconds)
                .ok()
                .zip(u32::try_from(nanos).ok())
                .and_then(|(seconds, nanos)| NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos))
                .map_or(Data::Int(value), |time| {
                    Data::DateTimeIso(time.format("%H:%M:%S%.f").to_string())
                })
        }
        other => Data::String(format!("{other:?}")),
    }
}

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

/// Converts a cell to the value bound for a column of type `kind`.
///
/// Temporal columns receive text that the insert statement casts.
fn to_value(cell: &Data, kind: ColumnType) -> Value {
    if is_null(cell) || matches!(cell, Data::Error(_)) {
        return Value::Null;
    }
    match (kind, cell) {
        (ColumnType::Boolean, Data::Bool(value)) => Value::Boolean(*value),
        (ColumnType::BigInt, Data::Int(value)) => Value::BigInt(*value),
        (ColumnType::BigInt, Data::Float(value)) => Value::BigInt(*value as i64),
        (ColumnType::Double, Data::Int(value)) => Value::Double(*value as f64),
        (ColumnType::Double, Data::Float(value)) => Value::Double(*value),
        (ColumnType::Date, _) => {
            let text = to_text(cell);
            match text.split_once(' ') {
                Some((date, _)) => Value::Text(date.to_owned()),
                None => Value::Text(text),
            }
        }
        _ => Value::Text(to_text(cell)),
    }
}
