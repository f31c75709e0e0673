use calamine::{CellErrorType, Data};
use iso8601_duration::Duration as IsoDuration;

/// Returns true if the cell holds no value: empty, an empty string or `#N/A`.
pub(crate) fn is_null(value: &Data) -> bool {
    match value {
        Data::Empty | Data::Error(CellErrorType::NA) => true,
        Data::String(value) => value.is_empty(),
        _ => false,
    }
}

/// Renders a cell value as text, the way it appears in CSV output.
///
/// Null cells render as an empty string. Excel serial dates are split into
/// time-only (serial <= 1), date-only (no fraction) and full datetime values.
pub fn to_text(value: &Data) -> String {
    match value {
        Data::Empty => String::new(),
        Data::Bool(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => value.to_string(),
        Data::String(value) => value.to_owned(),
        Data::DateTime(value) => {
            let serial = value.as_f64();
            match value.as_datetime() {
                Some(datetime) if serial <= 1.0 => datetime.time().to_string(),
                Some(datetime) if serial.fract() == 0.0 => datetime.date().to_string(),
                Some(datetime) => datetime.to_string(),
                None => serial.to_string(),
            }
        }
        Data::DateTimeIso(value) => value.replace('T', " "),
        Data::DurationIso(value) => to_duration_text(value),
        Data::Error(CellErrorType::NA) => String::new(),
        Data::Error(error) => error.to_string(),
    }
}

/// Converts an ISO 8601 duration ("PT1H2M3S") to "01:02:03".
fn to_duration_text(value: &str) -> String {
    match value.parse::<IsoDuration>() {
        Ok(duration) => {
            let hours = duration.day as i64 * 24 + duration.hour as i64;
            let minutes = duration.minute as i64;
            let seconds = duration.second as i64;
            format!("{hours:02}:{minutes:02}:{seconds:02}")
        }
        Err(_) => value.to_owned(),
    }
}

/// Hashable identity of a cell value, used to find distinct values.
///
/// Floats compare by bit pattern; all null representations share one key.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub(crate) enum CellKey<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    DateTime(u64),
    Text(&'a str),
    Iso(&'a str),
    Error(String),
}

impl<'a> From<&'a Data> for CellKey<'a> {
    fn from(value: &'a Data) -> Self {
        match value {
            value if is_null(value) => CellKey::Null,
            Data::Bool(value) => CellKey::Bool(*value),
            Data::Int(value) => CellKey::Int(*value),
            Data::Float(value) => CellKey::Float(value.to_bits()),
            Data::DateTime(value) => CellKey::DateTime(value.as_f64().to_bits()),
            Data::String(value) => CellKey::Text(value),
            Data::DateTimeIso(value) | Data::DurationIso(value) => CellKey::Iso(value),
            Data::Error(error) => CellKey::Error(error.to_string()),
            Data::Empty => CellKey::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn renders_plain_values() {
        assert_eq!(to_text(&Data::Empty), "");
        assert_eq!(to_text(&Data::Bool(true)), "true");
        assert_eq!(to_text(&Data::Int(42)), "42");
        assert_eq!(to_text(&Data::Float(1.0)), "1");
        assert_eq!(to_text(&Data::Float(2.5)), "2.5");
        assert_eq!(to_text(&Data::String("Qty".to_owned())), "Qty");
        assert_eq!(to_text(&Data::Error(CellErrorType::Div0)), "#DIV/0!");
    }

    #[test]
    fn renders_iso_values() {
        assert_eq!(
            to_text(&Data::DateTimeIso("2024-03-01T10:30:00".to_owned())),
            "2024-03-01 10:30:00"
        );
        assert_eq!(to_text(&Data::DurationIso("PT1H2M3S".to_owned())), "01:02:03");
    }

    #[test]
    fn nulls_share_a_key() {
        let empty = Data::Empty;
        let blank = Data::String(String::new());
        let missing = Data::Error(CellErrorType::NA);
        assert!(is_null(&empty));
        assert!(is_null(&blank));
        assert!(is_null(&missing));
        assert!(!is_null(&Data::Error(CellErrorType::Div0)));
        assert_eq!(to_text(&missing), "");
        assert_eq!(CellKey::from(&empty), CellKey::from(&blank));
        assert_eq!(CellKey::from(&empty), CellKey::from(&missing));
        assert_ne!(CellKey::from(&Data::Int(1)), CellKey::from(&Data::Float(1.0)));
    }
}
