//! Row loader - reads the first sheet of a workbook (or a CSV export of it)
//! into rows keyed by header name.

use crate::cell::{CellValue, EMPTY_CELL};
use crate::error::ConvertError;
use crate::grouping::columns;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

/// One data line of the source sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// 1-based line in the source, header included
    pub line: usize,
    cells: HashMap<String, CellValue>,
}

impl Row {
    /// Build a row from `(header, value)` pairs. Header names are trimmed;
    /// empty names are dropped and the first occurrence of a name wins.
    pub fn from_cells<I, K>(line: usize, cells: I) -> Self
    where
        I: IntoIterator<Item = (K, CellValue)>,
        K: AsRef<str>,
    {
        let mut map = HashMap::new();
        for (name, value) in cells {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            map.entry(name.to_string()).or_insert(value);
        }
        Row { line, cells: map }
    }

    /// Cell under `column`, or an empty text cell if the column is missing.
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }

    pub fn text(&self, column: &str) -> String {
        self.get(column).to_text()
    }

    /// Text of `column`, or `default` when the cell is falsy.
    pub fn text_or(&self, column: &str, default: &str) -> String {
        let cell = self.get(column);
        if cell.is_falsy() {
            default.to_string()
        } else {
            cell.to_text()
        }
    }

    pub fn number(&self, column: &str) -> f64 {
        self.get(column).to_number()
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_blank)
    }
}

/// Load every data row of `path`.
///
/// `.csv` files go through the CSV reader; everything else is opened as a
/// workbook (xlsx, xlsm, xls, xlsb, ods) and only the first sheet is read.
/// Fully blank lines are skipped.
pub async fn load_rows(path: &Path) -> Result<Vec<Row>, ConvertError> {
    fs::metadata(path)
        .await
        .map_err(|e| ConvertError::io(path, e))?;

    if is_csv_file(path) {
        let bytes = fs::read(path).await.map_err(|e| ConvertError::io(path, e))?;
        println!("Reading CSV file: {} ({} bytes)", path.display(), bytes.len());
        parse_csv_rows(&decode_text(&bytes))
    } else {
        read_workbook_rows(path)
    }
}

fn is_csv_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

fn read_workbook_rows(path: &Path) -> Result<Vec<Row>, ConvertError> {
    println!("Opening workbook: {}", path.display());

    // calamine picks the format from the extension
    let mut workbook = open_workbook_auto(path)?;

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = first_sheet(&sheet_names)?;
    println!("Reading sheet: '{}' (first of {} sheets)", sheet_name, sheet_names.len());

    let range = workbook.worksheet_range(&sheet_name)?;
    let (row_count, col_count) = range.get_size();
    println!("Sheet size: {} rows x {} columns", row_count, col_count);

    // Used range may start below row 1
    let first_line = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

    let mut lines = range.rows();
    let headers: Vec<String> = lines
        .next()
        .map(|cells| cells.iter().map(header_name).collect())
        .unwrap_or_default();
    require_key_column(&headers, &sheet_name)?;

    let rows = lines
        .enumerate()
        .map(|(idx, cells)| {
            let values = headers.iter().zip(cells.iter().map(decode_cell));
            Row::from_cells(first_line + idx + 1, values)
        })
        .filter(|row| !row.is_blank())
        .collect();

    Ok(rows)
}

/// Only the first sheet holds measurement rows.
fn first_sheet(names: &[String]) -> Result<String, ConvertError> {
    names.first().cloned().ok_or(ConvertError::NoSheets)
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        other => decode_cell(other).to_text().trim().to_string(),
    }
}

/// Decode a cell by its native type. Errors and empty cells become empty
/// text.
fn decode_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) if dt.is_datetime() => match dt.as_datetime() {
            Some(datetime) => CellValue::Date(datetime.date()),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        _ => CellValue::empty(),
    }
}

fn require_key_column(headers: &[String], sheet: &str) -> Result<(), ConvertError> {
    if headers.iter().any(|h| h == columns::PROJECT) {
        Ok(())
    } else {
        Err(ConvertError::MissingHeader {
            sheet: sheet.to_string(),
            column: columns::PROJECT,
        })
    }
}

/// Decode CSV bytes. Exports from older spreadsheet tools are Windows-1252
/// rather than UTF-8.
fn decode_text(bytes: &[u8]) -> String {
    let encoding = if std::str::from_utf8(bytes).is_ok() {
        encoding_rs::UTF_8
    } else {
        eprintln!("Warning: input is not UTF-8, decoding as Windows-1252");
        encoding_rs::WINDOWS_1252
    };
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Semicolon for pt-BR exports, comma otherwise.
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

/// Parse CSV content into rows. Every cell is text; the date and number
/// coercions downstream handle the rest.
pub fn parse_csv_rows(content: &str) -> Result<Vec<Row>, ConvertError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(content))
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    require_key_column(&headers, "csv")?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let values = headers
            .iter()
            .zip(record.iter().map(CellValue::text));
        let row = Row::from_cells(idx + 2, values); // +2 for 1-indexed + header
        if !row.is_blank() {
            rows.push(row);
        }
    }

    println!("Parsed {} CSV rows", rows.len());
    Ok(rows)
}
