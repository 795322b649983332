// src/table.rs

use std::fmt;

/// One cell of a loaded export.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// Trimmed, lowercased form used for label comparisons.
    pub fn label(&self) -> String {
        self.to_string().trim().to_lowercase()
    }

    /// Numeric value of the cell, with thousands separators stripped.
    /// `None` when the cell is empty or not a number.
    pub fn number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if !n.is_nan() => Some(*n),
            Cell::Number(_) | Cell::Empty => None,
            Cell::Text(s) => parse_number(s),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => f.write_str(&format_number(*n)),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// Strip commas and parse as `f64`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Integral values print without a fractional part ("3" rather than "3.0").
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        if n == 0.0 {
            return "0".to_string();
        }
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// A loaded export: normalized column names plus rows of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, normalizing column names (trim + lowercase).
    /// Rows shorter than the header are padded with `Cell::Empty`;
    /// longer rows are cut to the header width.
    pub fn new<S: AsRef<str>>(columns: &[S], rows: Vec<Vec<Cell>>) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| normalize_column(c.as_ref())).collect();
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }
}

fn normalize_column(raw: &str) -> String {
    raw.trim().to_lowercase()
}
