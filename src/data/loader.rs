use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, CellErrorType, Data, Reader};
use thiserror::Error;

use super::model::{clean_headers, is_missing_marker, unify_column, Cell, Column, ColumnKind, Table};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("no columns to parse from file")]
    NoColumns,
    #[error("workbook has no worksheets")]
    NoWorksheet,
    #[error("line {line}: expected {expected} fields, saw {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse uploaded bytes into a [`Table`]. Dispatch by file name:
///
/// * `*.csv` – comma-separated text with a header row
/// * anything else – spreadsheet (xlsx, xls, xlsb, ods); first worksheet,
///   first row is the header
pub fn ingest(bytes: &[u8], file_name: &str) -> Result<Table, ParseError> {
    let table = if file_name.to_ascii_lowercase().ends_with(".csv") {
        parse_csv(bytes)?
    } else {
        parse_spreadsheet(bytes)?
    };
    log::info!(
        "Ingested '{file_name}': {} rows x {} columns",
        table.len(),
        table.width()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Short rows are padded with missing values; long rows are an error.
fn parse_csv(bytes: &[u8]) -> Result<Table, ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(ParseError::NoColumns);
    }
    let width = headers.len();
    let names = clean_headers(headers.iter().map(str::to_string));

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); width];
    for result in reader.records() {
        let record = result?;
        if record.is_empty() {
            continue;
        }
        if record.len() > width {
            return Err(ParseError::TooManyFields {
                line: record.position().map_or(0, |p| p.line()),
                expected: width,
                found: record.len(),
            });
        }
        for (col, slot) in raw.iter_mut().enumerate() {
            slot.push(record.get(col).unwrap_or("").to_string());
        }
    }

    let n_rows = raw.first().map_or(0, Vec::len);
    let columns = names
        .into_iter()
        .zip(raw)
        .map(|(name, fields)| Column::new(name, infer_csv_column(fields)))
        .collect();
    Ok(Table::from_parts(columns, (0..n_rows).collect()))
}

/// Type a column of raw text fields. Text columns keep the original field
/// text, so `"007"` stays `"007"` next to `"abc"`.
fn infer_csv_column(fields: Vec<String>) -> Vec<Cell> {
    let parsed: Vec<Cell> = fields.iter().map(|f| Cell::parse(f)).collect();
    match ColumnKind::of(&parsed) {
        ColumnKind::Text => fields
            .into_iter()
            .zip(parsed)
            .map(|(field, cell)| if cell.is_missing() { Cell::Missing } else { Cell::Text(field) })
            .collect(),
        kind => kind.coerce(parsed),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet
// ---------------------------------------------------------------------------

fn parse_spreadsheet(bytes: &[u8]) -> Result<Table, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ParseError::NoWorksheet)?;
    let range = workbook.worksheet_range(&sheet_name)?;
    log::debug!("Reading worksheet '{sheet_name}' ({:?})", range.get_size());

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Table::default());
    };
    let names = clean_headers(header_row.iter().map(header_text));

    let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (slot, data) in cells.iter_mut().zip(row) {
            slot.push(data_to_cell(data));
        }
    }

    let n_rows = cells.first().map_or(0, Vec::len);
    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, unify_column(values)))
        .collect();
    Ok(Table::from_parts(columns, (0..n_rows).collect()))
}

fn header_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_INT => (*f as i64).to_string(),
        other => other.to_string(),
    }
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Missing,
        Data::Int(i) => Cell::Integer(*i),
        Data::Float(f) if f.is_nan() => Cell::Missing,
        // Spreadsheets store every number as a float.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_INT => Cell::Integer(*f as i64),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) if is_missing_marker(s) => Cell::Missing,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Error(CellErrorType::NA) => Cell::Missing,
        Data::Error(e) => Cell::Text(e.to_string()),
        Data::DateTime(dt) if dt.is_duration() => match dt.as_duration() {
            Some(d) => Cell::Text(d.to_string()),
            None => Cell::Text(data.to_string()),
        },
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => Cell::Text(d.to_string()),
            None => Cell::Text(data.to_string()),
        },
        // Already ISO 8601 text.
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    #[test]
    fn csv_infers_column_kinds() {
        let table = ingest(b"id,score,name,ok\n1,2.5,ann,True\n2,3,bob,False\n", "x.csv").unwrap();
        assert_eq!(table.column_names(), vec!["id", "score", "name", "ok"]);
        assert_eq!(table.column("id").unwrap().values, vec![Cell::Integer(1), Cell::Integer(2)]);
        assert_eq!(table.column("score").unwrap().values, vec![Cell::Float(2.5), Cell::Float(3.0)]);
        assert_eq!(table.column("ok").unwrap().kind(), ColumnKind::Bool);
    }

    #[test]
    fn csv_suffix_is_case_insensitive() {
        let table = ingest(b"a\n1\n", "DATA.CSV").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn csv_pads_short_rows_with_missing() {
        let table = ingest(b"a,b\n1,2\n3\n", "x.csv").unwrap();
        assert_eq!(table.column("b").unwrap().values, vec![Cell::Integer(2), Cell::Missing]);
    }

    #[test]
    fn csv_rejects_long_rows() {
        let err = ingest(b"a,b\n1,2,3\n", "x.csv").unwrap_err();
        assert!(matches!(err, ParseError::TooManyFields { expected: 2, found: 3, .. }));
    }

    #[test]
    fn empty_csv_has_no_columns() {
        assert!(matches!(ingest(b"", "x.csv"), Err(ParseError::NoColumns)));
    }

    #[test]
    fn csv_strips_bom_and_recognises_missing_markers() {
        let table = ingest(b"\xEF\xBB\xBFa,b\nNA,x\n2,\n", "x.csv").unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.column("a").unwrap().values, vec![Cell::Missing, Cell::Integer(2)]);
        assert_eq!(table.column("b").unwrap().values, vec![Cell::Text("x".into()), Cell::Missing]);
    }

    #[test]
    fn csv_text_column_keeps_original_fields() {
        let table = ingest(b"code\n007\nabc\n", "x.csv").unwrap();
        assert_eq!(
            table.column("code").unwrap().values,
            vec![Cell::Text("007".into()), Cell::Text("abc".into())]
        );
    }

    #[test]
    fn garbage_spreadsheet_is_a_parse_error() {
        let err = ingest(b"definitely not a zip archive", "book.xlsx").unwrap_err();
        assert!(matches!(err, ParseError::Spreadsheet(_)));
    }

    #[test]
    fn reads_first_worksheet() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "id").unwrap();
        sheet.write_string(0, 1, "label").unwrap();
        sheet.write_number(1, 0, 1).unwrap();
        sheet.write_string(1, 1, "first").unwrap();
        sheet.write_number(2, 0, 2.5).unwrap();
        sheet.write_string(2, 1, "NA").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = ingest(&bytes, "book.xlsx").unwrap();
        assert_eq!(table.column_names(), vec!["id", "label"]);
        assert_eq!(table.column("id").unwrap().values, vec![Cell::Float(1.0), Cell::Float(2.5)]);
        assert_eq!(
            table.column("label").unwrap().values,
            vec![Cell::Text("first".into()), Cell::Missing]
        );
    }

    #[test]
    fn spreadsheet_dates_read_as_iso_text() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let date = ExcelDateTime::from_ymd(2024, 1, 15).unwrap();
        let format = Format::new().set_num_format("yyyy-mm-dd");
        sheet.write_string(0, 0, "day").unwrap();
        sheet.write_datetime_with_format(1, 0, &date, &format).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = ingest(&bytes, "dates.xlsx").unwrap();
        assert_eq!(
            table.column("day").unwrap().values,
            vec![Cell::Text("2024-01-15 00:00:00".into())]
        );
    }
}
