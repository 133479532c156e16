use std::fmt;

use rust_xlsxwriter::{Workbook, XlsxError};
use thiserror::Error;

use crate::data::model::{Cell, Table};

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV buffer flush failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Excel write failed: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("table has {0} rows, more than a worksheet holds")]
    TooManyRows(usize),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Excel];

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Excel => "Excel",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_MIME,
            ExportFormat::Excel => XLSX_MIME,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A converted file ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Serialise `table` with a header row and no row index.
pub fn export(table: &Table, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let bytes = match format {
        ExportFormat::Csv => write_csv(table)?,
        ExportFormat::Excel => write_xlsx(table)?,
    };
    log::info!(
        "Exported {} rows as {format} ({} bytes)",
        table.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Like [`export`], named `{stem}.{extension}`.
pub fn export_artifact(
    table: &Table,
    format: ExportFormat,
    stem: &str,
) -> Result<ExportArtifact, ExportError> {
    Ok(ExportArtifact {
        file_name: format!("{stem}.{}", format.extension()),
        mime: format.mime(),
        bytes: export(table, format)?,
    })
}

fn write_csv(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.column_names())?;
    for row in 0..table.len() {
        writer.write_record(table.row(row).map(|cell| cell.to_field().into_owned()))?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Header row 0, data from row 1.
fn write_xlsx(table: &Table) -> Result<Vec<u8>, ExportError> {
    // Header takes one row; worksheets hold 1_048_576.
    if table.len() >= 1_048_576 {
        return Err(ExportError::TooManyRows(table.len()));
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col_idx, column) in table.columns().iter().enumerate() {
        let col = u16::try_from(col_idx).map_err(|_| XlsxError::RowColumnLimitError)?;
        worksheet.write_string(0, col, &column.name)?;
        for (row_idx, cell) in column.values.iter().enumerate() {
            let row = row_idx as u32 + 1;
            match cell {
                Cell::Integer(i) => {
                    worksheet.write_number(row, col, *i as f64)?;
                }
                Cell::Float(f) => {
                    worksheet.write_number(row, col, *f)?;
                }
                Cell::Bool(b) => {
                    worksheet.write_boolean(row, col, *b)?;
                }
                Cell::Text(s) => {
                    worksheet.write_string(row, col, s)?;
                }
                Cell::Missing => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn table() -> Table {
        Table::new(vec![
            Column::new("id", vec![Cell::Integer(1), Cell::Integer(2)]),
            Column::new("score", vec![Cell::Float(1.0), Cell::Missing]),
            Column::new("note", vec![Cell::Text("a, b".into()), Cell::Bool(true)]),
        ])
        .unwrap()
    }

    #[test]
    fn csv_has_header_and_no_index() {
        let bytes = export(&table(), ExportFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "id,score,note\n1,1.0,\"a, b\"\n2,,True\n");
    }

    #[test]
    fn xlsx_is_a_zip_archive() {
        let bytes = export(&table(), ExportFormat::Excel).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn artifact_names_follow_format() {
        let csv = export_artifact(&table(), ExportFormat::Csv, "converted_file").unwrap();
        assert_eq!(csv.file_name, "converted_file.csv");
        assert_eq!(csv.mime, "text/csv");

        let xlsx = export_artifact(&table(), ExportFormat::Excel, "converted_file").unwrap();
        assert_eq!(xlsx.file_name, "converted_file.xlsx");
        assert_eq!(xlsx.mime, XLSX_MIME);
    }
}
