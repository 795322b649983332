// src/columns.rs

use crate::table::Table;
use tracing::{debug, warn};

/// Substring test applied to a normalized column name.
#[derive(Debug, Clone, Copy)]
pub enum ColumnHint {
    /// Name must contain every listed substring.
    AllOf(&'static [&'static str]),
    /// Name must contain at least one listed substring.
    AnyOf(&'static [&'static str]),
}

impl ColumnHint {
    pub fn matches(&self, column: &str) -> bool {
        match self {
            ColumnHint::AllOf(parts) => parts.iter().all(|p| column.contains(p)),
            ColumnHint::AnyOf(parts) => parts.iter().any(|p| column.contains(p)),
        }
    }
}

/// Positional column used when no name matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    First,
    Last,
    /// Zero-based position, clamped to the last column.
    Index(usize),
}

/// How to find one column in a table.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRole {
    pub hint: Option<ColumnHint>,
    pub fallback: Fallback,
}

impl ColumnRole {
    pub const fn hinted(hint: ColumnHint, fallback: Fallback) -> Self {
        Self {
            hint: Some(hint),
            fallback,
        }
    }

    /// A column identified only by position.
    pub const fn fixed(position: Fallback) -> Self {
        Self {
            hint: None,
            fallback: position,
        }
    }
}

/// Find the column for `role`: the first column (in table order) whose
/// name satisfies the hint, else the positional fallback.
///
/// Returns a position rather than a name, since exports can repeat a
/// header (blank header cells all normalize to ""). Tables are guaranteed
/// at load time to have at least one column.
pub fn resolve(table: &Table, role: &ColumnRole) -> usize {
    let columns = table.columns();

    if let Some(hint) = &role.hint {
        if let Some(idx) = columns.iter().position(|c| hint.matches(c)) {
            debug!(column = %columns[idx], idx, ?hint, "Column resolved by name");
            return idx;
        }
    }

    let last = columns.len().saturating_sub(1);
    let idx = match role.fallback {
        Fallback::First => 0,
        Fallback::Last => last,
        Fallback::Index(i) => i.min(last),
    };
    if role.hint.is_some() {
        warn!(
            hint = ?role.hint,
            column = columns.get(idx).map(String::as_str).unwrap_or_default(),
            idx,
            "No column matched hint, using positional fallback"
        );
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    const QTY: ColumnRole =
        ColumnRole::hinted(ColumnHint::AnyOf(&["quantity", "sold"]), Fallback::Last);

    fn table(cols: &[&str]) -> Table {
        Table::new(cols, vec![])
    }

    #[test]
    fn test_all_of_requires_every_part() {
        let t = table(&["type", "payment method", "payment type", "amount"]);
        let role = ColumnRole::hinted(ColumnHint::AllOf(&["payment", "type"]), Fallback::First);
        assert_eq!(resolve(&t, &role), 2);
    }

    #[test]
    fn test_any_of_takes_first_in_column_order() {
        let t = table(&["option name", "items sold", "quantity"]);
        assert_eq!(resolve(&t, &QTY), 1);
    }

    #[test]
    fn test_fallback_positions() {
        let t = table(&["a", "b", "c"]);
        assert_eq!(resolve(&t, &QTY), 2);

        let second = ColumnRole::hinted(ColumnHint::AnyOf(&["modifier"]), Fallback::Index(1));
        assert_eq!(resolve(&t, &second), 1);

        let first = ColumnRole::fixed(Fallback::First);
        assert_eq!(resolve(&t, &first), 0);
    }

    #[test]
    fn test_index_fallback_clamps() {
        let t = table(&["only"]);
        let role = ColumnRole::hinted(ColumnHint::AnyOf(&["modifier"]), Fallback::Index(1));
        assert_eq!(resolve(&t, &role), 0);
    }

    #[test]
    fn test_never_fails_without_match() {
        let t = table(&["x", "y"]);
        for role in [
            QTY,
            ColumnRole::fixed(Fallback::Last),
            ColumnRole::hinted(ColumnHint::AllOf(&["item", "sold"]), Fallback::Index(9)),
        ] {
            assert!(resolve(&t, &role) < t.columns().len());
        }
    }

    #[test]
    fn test_repeated_headers_resolve_by_position() {
        let t = table(&["Payment Type", "", "Count", ""]);
        assert_eq!(t.columns(), ["payment type", "", "count", ""]);
        assert_eq!(resolve(&t, &ColumnRole::fixed(Fallback::Last)), 3);
        assert_eq!(resolve(&t, &QTY), 3);

        let t = table(&["amount", "amount"]);
        assert_eq!(resolve(&t, &ColumnRole::fixed(Fallback::Last)), 1);
    }
}
