use super::ExtractionResult;
use super::rules::{Columns, Rule, Term, apply};
use crate::columns::{ColumnHint, ColumnRole, Fallback, resolve};
use crate::table::Table;

const PAYMENT_TYPE: ColumnRole =
    ColumnRole::hinted(ColumnHint::AllOf(&["payment", "type"]), Fallback::First);
const AMOUNT: ColumnRole = ColumnRole::fixed(Fallback::Last);

/// GCash is recorded as a negative amount. A non-numeric amount yields a
/// blank entry rather than dropping the key.
pub fn rules() -> Vec<Rule> {
    vec![
        Rule::option(Term::first("GCash"))
            .negated()
            .keep_zero()
            .blank_on_unparsable(),
    ]
}

#[tracing::instrument(level = "info", skip_all)]
pub fn extract(table: &Table) -> ExtractionResult {
    let cols = Columns {
        label: resolve(table, &PAYMENT_TYPE),
        group: None,
        value: resolve(table, &AMOUNT),
    };
    let mut out = ExtractionResult::default();
    apply(&rules(), table, &cols, &mut out);
    out
}
