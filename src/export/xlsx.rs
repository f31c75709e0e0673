//! Minimal XLSX writer
//!
//! Writes one worksheet per [`Table`]: a plain header row followed by the data rows.
//! Strings are stored inline and numbers and booleans natively. Dates, times and
//! durations are stored as Excel serial numbers with a date, datetime or time number
//! format, the only styles the workbook carries.

use crate::error::WorkbookError;
use crate::spreadsheet::cell::to_text;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::Table;
use calamine::Data;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use iso8601_duration::Duration as IsoDuration;
use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashSet;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PACKAGE_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const TYPE_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
const TYPE_WORKBOOK: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const TYPE_WORKSHEET: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const TYPE_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";

/// Custom number formats, in `cellXfs` order after the default style
const NUMBER_FORMATS: [(&str, &str); 3] = [
    ("164", "yyyy-mm-dd"),
    ("165", "yyyy-mm-dd hh:mm:ss"),
    ("166", "hh:mm:ss"),
];

/// Indexes into `cellXfs`
const STYLE_DATE: &str = "1";
const STYLE_DATETIME: &str = "2";
const STYLE_TIME: &str = "3";

/// Serial number of 1970-01-01 in the 1900 date system
const UNIX_EPOCH_SERIAL: f64 = 25_569.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Longest sheet name Excel accepts
const MAX_SHEET_NAME_LENGTH: usize = 31;

/// Errors in the tables handed to the XLSX writer.
#[derive(Error, Debug)]
pub enum XlsxError {
    #[error("A workbook needs at least one sheet")]
    NoSheets,

    #[error("Invalid sheet name '{0}'")]
    InvalidSheetName(String),

    #[error("Duplicate sheet name '{0}'")]
    DuplicateSheetName(String),
}

/// Writes `tables` to a new XLSX file at `path`, one sheet per table named after it.
pub fn write_xlsx<P: AsRef<Path>>(tables: &[Table], path: P) -> Result<(), WorkbookError> {
    let path = path.as_ref();
    debug!("Writing {} sheet(s) to '{}'", tables.len(), path.display());
    validate_sheet_names(tables)?;
    let file = File::create(path)?;
    write_xlsx_to(tables, file)?;
    Ok(())
}

/// Writes `tables` as an XLSX package to any seekable writer and returns the writer.
pub fn write_xlsx_to<W: Write + Seek>(tables: &[Table], writer: W) -> Result<W, WorkbookError> {
    validate_sheet_names(tables)?;
    let mut zip = ZipWriter::new(writer);

    write_content_types(&mut zip, tables.len())?;
    write_root_relationships(&mut zip)?;
    write_workbook(&mut zip, tables)?;
    write_workbook_relationships(&mut zip, tables.len())?;
    write_styles(&mut zip)?;
    for (index, table) in tables.iter().enumerate() {
        write_worksheet(&mut zip, index, table)?;
    }

    Ok(zip.finish()?)
}

/// Checks the sheet names against Excel's rules before anything is written.
fn validate_sheet_names(tables: &[Table]) -> Result<(), XlsxError> {
    if tables.is_empty() {
        return Err(XlsxError::NoSheets);
    }
    let mut seen = HashSet::new();
    for table in tables {
        let name = table.name();
        let is_valid = !name.is_empty()
            && name.chars().count() <= MAX_SHEET_NAME_LENGTH
            && !name.contains(['[', ']', ':', '*', '?', '/', '\\'])
            && !name.starts_with('\'')
            && !name.ends_with('\'');
        if !is_valid {
            return Err(XlsxError::InvalidSheetName(name.to_owned()));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(XlsxError::DuplicateSheetName(name.to_owned()));
        }
    }
    Ok(())
}

/// Starts a new part in the archive and returns an XML writer positioned after the declaration.
fn start_part<'a, W: Write + Seek>(
    zip: &'a mut ZipWriter<W>,
    name: &str,
) -> Result<Writer<&'a mut ZipWriter<W>>, WorkbookError> {
    zip.start_file(name, SimpleFileOptions::default())?;
    let mut writer = Writer::new(zip);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(writer)
}

fn element<'a>(name: &'a str, attributes: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    let mut element = BytesStart::new(name);
    for attribute in attributes {
        element.push_attribute(*attribute);
    }
    element
}

fn write_content_types<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    sheet_count: usize,
) -> Result<(), WorkbookError> {
    let mut writer = start_part(zip, "[Content_Types].xml")?;
    writer.write_event(Event::Start(element("Types", &[("xmlns", NS_CONTENT_TYPES)])))?;
    writer.write_event(Event::Empty(element(
        "Default",
        &[("Extension", "rels"), ("ContentType", TYPE_RELATIONSHIPS)],
    )))?;
    writer.write_event(Event::Empty(element(
        "Default",
        &[("Extension", "xml"), ("ContentType", "application/xml")],
    )))?;
    writer.write_event(Event::Empty(element(
        "Override",
        &[("PartName", "/xl/workbook.xml"), ("ContentType", TYPE_WORKBOOK)],
    )))?;
    writer.write_event(Event::Empty(element(
        "Override",
        &[("PartName", "/xl/styles.xml"), ("ContentType", TYPE_STYLES)],
    )))?;
    for index in 0..sheet_count {
        let part_name = format!("/xl/worksheets/sheet{}.xml", index + 1);
        writer.write_event(Event::Empty(element(
            "Override",
            &[("PartName", part_name.as_str()), ("ContentType", TYPE_WORKSHEET)],
        )))?;
    }
    writer.write_event(Event::End(BytesEnd::new("Types")))?;
    Ok(())
}

fn write_root_relationships<W: Write + Seek>(zip: &mut ZipWriter<W>) -> Result<(), WorkbookError> {
    let mut writer = start_part(zip, "_rels/.rels")?;
    writer.write_event(Event::Start(element(
        "Relationships",
        &[("xmlns", NS_PACKAGE_RELATIONSHIPS)],
    )))?;
    writer.write_event(Event::Empty(element(
        "Relationship",
        &[
            ("Id", "rId1"),
            ("Type", REL_OFFICE_DOCUMENT),
            ("Target", "xl/workbook.xml"),
        ],
    )))?;
    writer.write_event(Event::End(BytesEnd::new("Relationships")))?;
    Ok(())
}

fn write_workbook<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    tables: &[Table],
) -> Result<(), WorkbookError> {
    let mut writer = start_part(zip, "xl/workbook.xml")?;
    writer.write_event(Event::Start(element(
        "workbook",
        &[("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)],
    )))?;
    writer.write_event(Event::Start(BytesStart::new("sheets")))?;
    for (index, table) in tables.iter().enumerate() {
        let sheet_id = (index + 1).to_string();
        let relationship_id = format!("rId{}", index + 1);
        writer.write_event(Event::Empty(element(
            "sheet",
            &[
                ("name", table.name()),
                ("sheetId", sheet_id.as_str()),
                ("r:id", relationship_id.as_str()),
            ],
        )))?;
    }
    writer.write_event(Event::End(BytesEnd::new("sheets")))?;
    writer.write_event(Event::End(BytesEnd::new("workbook")))?;
    Ok(())
}

fn write_workbook_relationships<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    sheet_count: usize,
) -> Result<(), WorkbookError> {
    let mut writer = start_part(zip, "xl/_rels/workbook.xml.rels")?;
    writer.write_event(Event::Start(element(
        "Relationships",
        &[("xmlns", NS_PACKAGE_RELATIONSHIPS)],
    )))?;
    for index in 0..sheet_count {
        let id = format!("rId{}", index + 1);
        let target = format!("worksheets/sheet{}.xml", index + 1);
        writer.write_event(Event::Empty(element(
            "Relationship",
            &[("Id", id.as_str()), ("Type", REL_WORKSHEET), ("Target", target.as_str())],
        )))?;
    }
    let styles_id = format!("rId{}", sheet_count + 1);
    writer.write_event(Event::Empty(element(
        "Relationship",
        &[("Id", styles_id.as_str()), ("Type", REL_STYLES), ("Target", "styles.xml")],
    )))?;
    writer.write_event(Event::End(BytesEnd::new("Relationships")))?;
    Ok(())
}

/// Writes the default style plus one style per temporal number format.
fn write_styles<W: Write + Seek>(zip: &mut ZipWriter<W>) -> Result<(), WorkbookError> {
    let mut writer = start_part(zip, "xl/styles.xml")?;
    writer.write_event(Event::Start(element("styleSheet", &[("xmlns", NS_MAIN)])))?;

    writer.write_event(Event::Start(element("numFmts", &[("count", "3")])))?;
    for (id, code) in NUMBER_FORMATS {
        writer.write_event(Event::Empty(element(
            "numFmt",
            &[("numFmtId", id), ("formatCode", code)],
        )))?;
    }
    writer.write_event(Event::End(BytesEnd::new("numFmts")))?;

    writer.write_event(Event::Start(element("fonts", &[("count", "1")])))?;
    writer.write_event(Event::Start(BytesStart::new("font")))?;
    writer.write_event(Event::Empty(element("sz", &[("val", "11")])))?;
    writer.write_event(Event::Empty(element("name", &[("val", "Calibri")])))?;
    writer.write_event(Event::End(BytesEnd::new("font")))?;
    writer.write_event(Event::End(BytesEnd::new("fonts")))?;

    writer.write_event(Event::Start(element("fills", &[("count", "2")])))?;
    for pattern in ["none", "gray125"] {
        writer.write_event(Event::Start(BytesStart::new("fill")))?;
        writer.write_event(Event::Empty(element("patternFill", &[("patternType", pattern)])))?;
        writer.write_event(Event::End(BytesEnd::new("fill")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("fills")))?;

    writer.write_event(Event::Start(element("borders", &[("count", "1")])))?;
    writer.write_event(Event::Start(BytesStart::new("border")))?;
    for side in ["left", "right", "top", "bottom", "diagonal"] {
        writer.write_event(Event::Empty(BytesStart::new(side)))?;
    }
    writer.write_event(Event::End(BytesEnd::new("border")))?;
    writer.write_event(Event::End(BytesEnd::new("borders")))?;

    let base = [("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0")];
    writer.write_event(Event::Start(element("cellStyleXfs", &[("count", "1")])))?;
    writer.write_event(Event::Empty(element("xf", &base)))?;
    writer.write_event(Event::End(BytesEnd::new("cellStyleXfs")))?;

    writer.write_event(Event::Start(element("cellXfs", &[("count", "4")])))?;
    writer.write_event(Event::Empty(element("xf", &[("numFmtId", "0"), ("xfId", "0")])))?;
    for (id, _) in NUMBER_FORMATS {
        writer.write_event(Event::Empty(element(
            "xf",
            &[
                ("numFmtId", id),
                ("fontId", "0"),
                ("fillId", "0"),
                ("borderId", "0"),
                ("xfId", "0"),
                ("applyNumberFormat", "1"),
            ],
        )))?;
    }
    writer.write_event(Event::End(BytesEnd::new("cellXfs")))?;

    writer.write_event(Event::Start(element("cellStyles", &[("count", "1")])))?;
    writer.write_event(Event::Empty(element(
        "cellStyle",
        &[("name", "Normal"), ("xfId", "0"), ("builtinId", "0")],
    )))?;
    writer.write_event(Event::End(BytesEnd::new("cellStyles")))?;

    writer.write_event(Event::End(BytesEnd::new("styleSheet")))?;
    Ok(())
}

fn write_worksheet<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    index: usize,
    table: &Table,
) -> Result<(), WorkbookError> {
    let part_name = format!("xl/worksheets/sheet{}.xml", index + 1);
    let mut writer = start_part(zip, &part_name)?;
    writer.write_event(Event::Start(element("worksheet", &[("xmlns", NS_MAIN)])))?;
    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;

    let header = table
        .columns()
        .iter()
        .map(|column| Data::String(column.to_owned()))
        .collect::<Vec<_>>();
    write_row(&mut writer, 0, &header)?;
    for (row, cells) in table.rows().iter().enumerate() {
        write_row(&mut writer, row + 1, cells)?;
    }

    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(())
}

fn write_row<W: Write>(writer: &mut Writer<W>, row: usize, cells: &[Data]) -> Result<(), WorkbookError> {
    let row_number = (row + 1).to_string();
    writer.write_event(Event::Start(element("row", &[("r", row_number.as_str())])))?;
    for (col, cell) in cells.iter().enumerate() {
        write_cell(writer, &index_to_reference(row, col), cell)?;
    }
    writer.write_event(Event::End(BytesEnd::new("row")))?;
    Ok(())
}

fn write_cell<W: Write>(writer: &mut Writer<W>, reference: &str, cell: &Data) -> Result<(), WorkbookError> {
    match cell {
        Data::Empty => Ok(()),
        Data::Int(value) => write_value_cell(writer, reference, None, &value.to_string()),
        Data::Float(value) => write_value_cell(writer, reference, None, &value.to_string()),
        Data::Bool(value) => {
            write_value_cell(writer, reference, Some(("t", "b")), if *value { "1" } else { "0" })
        }
        Data::Error(error) => write_value_cell(writer, reference, Some(("t", "e")), &error.to_string()),
        Data::String(value) => write_inline_string(writer, reference, value),
        Data::DateTime(_) | Data::DateTimeIso(_) | Data::DurationIso(_) => match to_serial(cell) {
            Some((serial, style)) => {
                write_value_cell(writer, reference, Some(("s", style)), &serial.to_string())
            }
            None => write_inline_string(writer, reference, &to_text(cell)),
        },
    }
}

/// Excel serial number of a temporal cell and the style that displays it.
///
/// Text that is not ISO 8601 yields `None` and is written as a string.
fn to_serial(cell: &Data) -> Option<(f64, &'static str)> {
    match cell {
        Data::DateTime(value) => {
            let serial = match value.as_datetime() {
                Some(datetime) if value.as_f64() >= 60.0 => datetime_serial(datetime),
                _ => value.as_f64(),
            };
            let style = if serial <= 1.0 {
                STYLE_TIME
            } else if serial.fract() == 0.0 {
                STYLE_DATE
            } else {
                STYLE_DATETIME
            };
            Some((serial, style))
        }
        Data::DateTimeIso(value) => iso_serial(value),
        Data::DurationIso(value) => {
            let duration = value.parse::<IsoDuration>().ok()?;
            let seconds = f64::from(duration.day) * 86_400.0
                + f64::from(duration.hour) * 3_600.0
                + f64::from(duration.minute) * 60.0
                + f64::from(duration.second);
            Some((seconds * 1_000.0 / MILLIS_PER_DAY, STYLE_TIME))
        }
        _ => None,
    }
}

fn iso_serial(value: &str) -> Option<(f64, &'static str)> {
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some((datetime_serial(datetime), STYLE_DATETIME));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|datetime| (datetime_serial(datetime), STYLE_DATE));
    }
    let time = NaiveTime::parse_from_str(value, "%H:%M:%S%.f").ok()?;
    let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
    let millis = (time - midnight).num_milliseconds() as f64;
    Some((millis / MILLIS_PER_DAY, STYLE_TIME))
}

fn datetime_serial(datetime: NaiveDateTime) -> f64 {
    datetime.and_utc().timestamp_millis() as f64 / MILLIS_PER_DAY + UNIX_EPOCH_SERIAL
}

/// Writes a `<v>` cell with an optional `t` (type) or `s` (style) attribute.
fn write_value_cell<W: Write>(
    writer: &mut Writer<W>,
    reference: &str,
    attribute: Option<(&str, &str)>,
    value: &str,
) -> Result<(), WorkbookError> {
    let mut cell = element("c", &[("r", reference)]);
    if let Some(attribute) = attribute {
        cell.push_attribute(attribute);
    }
    writer.write_event(Event::Start(cell))?;
    writer.write_event(Event::Start(BytesStart::new("v")))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new("v")))?;
    writer.write_event(Event::End(BytesEnd::new("c")))?;
    Ok(())
}

fn write_inline_string<W: Write>(writer: &mut Writer<W>, reference: &str, value: &str) -> Result<(), WorkbookError> {
    writer.write_event(Event::Start(element("c", &[("r", reference), ("t", "inlineStr")])))?;
    writer.write_event(Event::Start(BytesStart::new("is")))?;
    writer.write_event(Event::Start(element("t", &[("xml:space", "preserve")])))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new("t")))?;
    writer.write_event(Event::End(BytesEnd::new("is")))?;
    writer.write_event(Event::End(BytesEnd::new("c")))?;
    Ok(())
}
