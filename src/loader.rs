// src/loader.rs

use crate::error::{EncoderError, Result};
use crate::table::{Cell, Table};
use calamine::{Data, Reader, open_workbook_auto};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{debug, info};

/// How a file's contents are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Delimited,
    Spreadsheet,
}

impl TableFormat {
    /// Pick the format from the file extension; anything unrecognised is
    /// tried as a spreadsheet, which is how the exports usually arrive.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") | Some("txt") => TableFormat::Delimited,
            _ => TableFormat::Spreadsheet,
        }
    }
}

/// Read a whole export into memory as a `Table`.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let table = match TableFormat::from_path(path) {
        TableFormat::Delimited => {
            let data = std::fs::read(path)?;
            load_delimited(&data)?
        }
        TableFormat::Spreadsheet => load_spreadsheet(path)?,
    };

    if table.columns().is_empty() {
        return Err(EncoderError::EmptyTable(path.display().to_string()));
    }
    info!(
        columns = table.columns().len(),
        rows = table.rows().len(),
        "Table loaded"
    );
    Ok(table)
}

/// Parse delimited text. The first record is the header.
pub fn load_delimited(data: &[u8]) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut records = rdr.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(|s| s.to_string()).collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        rows.push(record.iter().map(text_cell).collect());
    }
    debug!(rows = rows.len(), "Parsed delimited text");
    Ok(Table::new(&headers, rows))
}

/// Parse the first worksheet of a workbook. The first row is the header.
pub fn load_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EncoderError::EmptyTable(path.display().to_string()))??;

    let mut iter = range.rows();
    let headers: Vec<String> = iter
        .next()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<Cell>> = iter.map(|row| row.iter().map(data_cell).collect()).collect();
    debug!(rows = rows.len(), "Parsed worksheet");
    Ok(Table::new(&headers, rows))
}

fn text_cell(raw: &str) -> Cell {
    if raw.trim().is_empty() {
        Cell::Empty
    } else {
        Cell::Text(raw.to_string())
    }
}

fn data_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Empty => Cell::Empty,
        Data::String(s) => text_cell(s),
        other => Cell::Text(other.to_string()),
    }
}
