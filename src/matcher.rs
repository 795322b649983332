// src/matcher.rs

use crate::table::{Cell, Table};
use tracing::{trace, warn};

/// How matching rows are combined into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Value of the first matching row.
    First,
    /// Sum over every matching row; unparsable cells count as zero.
    Sum,
}

/// Outcome of a row lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup {
    /// No row matched.
    Missing,
    /// The first matching row's value cell was not a number.
    Unparsable,
    Value(f64),
}

/// Which rows to look at and which column to read. Columns are positions
/// as returned by `columns::resolve`.
#[derive(Debug, Clone, Copy)]
pub struct RowQuery<'a> {
    pub label_column: usize,
    pub target: &'a str,
    /// Optional (column, substring) constraint, e.g. the modifier group.
    pub group: Option<(usize, &'a str)>,
    pub value_column: usize,
}

impl<'a> RowQuery<'a> {
    pub fn new(label_column: usize, target: &'a str, value_column: usize) -> Self {
        Self {
            label_column,
            target,
            group: None,
            value_column,
        }
    }

    pub fn within(mut self, group_column: usize, contains: &'a str) -> Self {
        self.group = Some((group_column, contains));
        self
    }
}

/// Matching rows in table order. Labels compare exactly after trimming and
/// lowercasing; the group cell only has to contain the (lowercased) substring.
fn matching_rows<'t>(table: &'t Table, q: &RowQuery<'_>) -> impl Iterator<Item = &'t Cell> + use<'t> {
    let (label_idx, value_idx) = (q.label_column, q.value_column);
    let group = q
        .group
        .map(|(col, needle)| (col, needle.trim().to_lowercase()));
    let target = q.target.trim().to_lowercase();

    table.rows().iter().filter_map(move |row| {
        let label = row.get(label_idx)?;
        if label.label() != target {
            return None;
        }
        if let Some((group_idx, needle)) = &group {
            let cell = row.get(*group_idx)?;
            if !cell.label().contains(needle.as_str()) {
                return None;
            }
        }
        row.get(value_idx)
    })
}

/// Value of the first matching row.
pub fn first(table: &Table, q: &RowQuery<'_>) -> Lookup {
    match matching_rows(table, q).next() {
        None => Lookup::Missing,
        Some(cell) => match cell.number() {
            Some(v) => {
                trace!(label = q.target, value = v, "Row matched");
                Lookup::Value(v)
            }
            None => {
                warn!(label = q.target, cell = %cell, "Matched row has a non-numeric value");
                Lookup::Unparsable
            }
        },
    }
}

/// Sum of every matching row; zero when nothing matches.
pub fn sum(table: &Table, q: &RowQuery<'_>) -> f64 {
    matching_rows(table, q)
        .map(|cell| cell.number().unwrap_or(0.0))
        .sum()
}

/// Run a query with the given aggregation. `Sum` never yields `Missing`.
pub fn aggregate(table: &Table, q: &RowQuery<'_>, aggregation: Aggregation) -> Lookup {
    match aggregation {
        Aggregation::First => first(table, q),
        Aggregation::Sum => Lookup::Value(sum(table, q)),
    }
}
