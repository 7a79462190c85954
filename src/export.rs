/// CSV export of a derived view
///
/// Exports take the filtered and sorted sequence (`derive`), never the
/// visible page. Every cell is quoted, matching what the dashboard's
/// download button has always produced.

use crate::error::ViewError;
use crate::record::Fields;
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::debug;
use std::io::Write;

/// How a field becomes a CSV cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellFormat {
    /// Text form, empty when missing
    Text,
    /// Text form, or the given placeholder when missing or empty
    TextOr(String),
    /// Calendar date of an instant (`YYYY-MM-DD`)
    Date,
    /// Time of day of an instant (`HH:MM:SS`, UTC)
    Time,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportColumn {
    pub header: String,
    pub field: String,
    pub format: CellFormat,
}

impl ExportColumn {
    pub fn new(header: impl Into<String>, field: impl Into<String>, format: CellFormat) -> Self {
        ExportColumn {
            header: header.into(),
            field: field.into(),
            format,
        }
    }

    fn cell<R: Fields>(&self, record: &R) -> String {
        let value = record.field(&self.field);
        match &self.format {
            CellFormat::Text => value.and_then(|v| v.to_text()).unwrap_or_default(),
            CellFormat::TextOr(placeholder) => value
                .filter(|v| v.is_present())
                .and_then(|v| v.to_text())
                .unwrap_or_else(|| placeholder.clone()),
            CellFormat::Date => value
                .and_then(|v| v.to_instant())
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            CellFormat::Time => value
                .and_then(|v| v.to_instant())
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Column layout of one export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvExport {
    columns: Vec<ExportColumn>,
}

impl CsvExport {
    pub fn new(columns: Vec<ExportColumn>) -> Self {
        CsvExport { columns }
    }

    pub fn column(mut self, header: &str, field: &str, format: CellFormat) -> Self {
        self.columns.push(ExportColumn::new(header, field, format));
        self
    }

    pub fn columns(&self) -> &[ExportColumn] {
        &self.columns
    }

    /// Write a header row plus one row per record. Returns the number of
    /// data rows written.
    pub fn write<R: Fields, W: Write>(&self, rows: &[&R], writer: W) -> Result<usize, ViewError> {
        if self.columns.is_empty() {
            return Err(ViewError::invalid("export needs at least one column"));
        }

        let mut wtr = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(writer);

        wtr.write_record(self.columns.iter().map(|c| c.header.as_str()))?;
        for row in rows {
            wtr.write_record(self.columns.iter().map(|c| c.cell(*row)))?;
        }
        wtr.flush()?;

        debug!("exported {} rows, {} columns", rows.len(), self.columns.len());
        Ok(rows.len())
    }

    pub fn to_csv_string<R: Fields>(&self, rows: &[&R]) -> Result<String, ViewError> {
        let mut buf = Vec::new();
        self.write(rows, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Download name for an export made on `date`: `subscribers-2024-05-01.csv`.
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.csv", prefix, date.format("%Y-%m-%d"))
}
