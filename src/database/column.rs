use crate::spreadsheet::cell::is_null;
use calamine::Data;

/// SQL types an uploaded sheet column can take.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnType {
    /// Boolean values (true/false)
    Boolean,
    /// 64-bit signed integers
    BigInt,
    /// Double-precision floating point numbers
    Double,
    /// Variable-length strings
    Varchar,
    /// Date and time with microsecond precision
    Timestamp,
    /// Date without time component
    Date,
    /// Time without date component
    Time,
}

/// Name and type of one column of an uploaded table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    /// Column name, already truncated to the configured limit
    pub name: String,
    /// Column data type
    pub kind: ColumnType,
}

impl ColumnType {
    /// Returns the SQL spelling of the type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "boolean",
            ColumnType::BigInt => "bigint",
            ColumnType::Double => "double",
            ColumnType::Varchar => "varchar",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
        }
    }

    /// Infers the type of a single cell. Null and error cells carry no type.
    pub fn from_cell(value: &Data) -> Option<Self> {
        match value {
            value if is_null(value) => None,
            Data::Empty | Data::Error(_) => None,
            Data::Bool(_) => Some(ColumnType::Boolean),
            Data::Int(_) => Some(ColumnType::BigInt),
            Data::Float(value) if Self::is_integer(*value) => Some(ColumnType::BigInt),
            Data::Float(_) => Some(ColumnType::Double),
            Data::DateTime(value) => {
                let serial = value.as_f64();
                if serial <= 1.0 {
                    Some(ColumnType::Time)
                } else if serial.fract() == 0.0 {
                    Some(ColumnType::Date)
                } else {
                    Some(ColumnType::Timestamp)
                }
            }
            Data::DateTimeIso(value) if value.ends_with("T00:00:00") => Some(ColumnType::Date),
            Data::DateTimeIso(value) if value.contains('T') => Some(ColumnType::Timestamp),
            Data::DateTimeIso(value) if value.contains(':') => Some(ColumnType::Time),
            Data::DateTimeIso(_) => Some(ColumnType::Date),
            Data::DurationIso(_) => Some(ColumnType::Time),
            Data::String(_) => Some(ColumnType::Varchar),
        }
    }

    /// Checks if a float holds an integral value that fits in a bigint.
    fn is_integer(value: f64) -> bool {
        value.is_finite()
            && value.fract() == 0.0
            && value >= i64::MIN as f64
            && value < i64::MAX as f64
    }

    /// Detects the most specific common type of the given cells.
    /// Falls back to VARCHAR if types are inconsistent or every cell is null.
    pub fn detect<'a>(cells: impl IntoIterator<Item = &'a Data>) -> ColumnType {
        let types: Vec<ColumnType> = cells.into_iter().filter_map(Self::from_cell).collect();
        if types.is_empty() {
            ColumnType::Varchar
        } else if types.iter().all(|kind| kind.is_boolean()) {
            ColumnType::Boolean
        } else if types.iter().all(|kind| kind.is_int()) {
            ColumnType::BigInt
        } else if types.iter().all(|kind| kind.is_float()) {
            ColumnType::Double
        } else if types.iter().all(|kind| kind.is_date()) {
            ColumnType::Date
        } else if types.iter().all(|kind| kind.is_time()) {
            ColumnType::Time
        } else if types.iter().all(|kind| kind.is_datetime()) {
            ColumnType::Timestamp
        } else {
            ColumnType::Varchar
        }
    }

    /// Returns true if values of this type are bound as text and cast in SQL.
    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Timestamp | ColumnType::Date | ColumnType::Time)
    }

    #[inline]
    fn is_boolean(&self) -> bool {
        matches!(self, ColumnType::Boolean)
    }

    #[inline]
    fn is_int(&self) -> bool {
        matches!(self, ColumnType::BigInt)
    }

    /// Integer or floating point
    #[inline]
    fn is_float(&self) -> bool {
        matches!(self, ColumnType::BigInt | ColumnType::Double)
    }

    #[inline]
    fn is_date(&self) -> bool {
        matches!(self, ColumnType::Date)
    }

    #[inline]
    fn is_time(&self) -> bool {
        matches!(self, ColumnType::Time)
    }

    /// Dates and timestamps widen to a timestamp. Times do not, since a bare time
    /// has no date to widen with.
    #[inline]
    fn is_datetime(&self) -> bool {
        matches!(self, ColumnType::Timestamp | ColumnType::Date)
    }
}
