use super::ExtractionResult;
use super::rules::{Columns, Rule, Term, apply};
use crate::columns::{ColumnHint, ColumnRole, Fallback, resolve};
use crate::table::Table;

const ITEM: ColumnRole = ColumnRole::fixed(Fallback::First);
const SOLD: ColumnRole = ColumnRole::hinted(ColumnHint::AllOf(&["item", "sold"]), Fallback::Last);

/// Products whose sold counts feed the template.
pub const WANTED_ITEMS: &[&str] = &[
    "Combo S1",
    "Combo S2",
    "Combo S3",
    "Sandwich Sampler",
    "Regular - Aloha",
    "Regular - Breakfast",
    "Regular - Chicken Pesto",
    "Regular - Pizza Panino",
    "Regular - Tuna Melt Chive",
    "Regular - Vegan",
    "Salad - Chicken Salad",
    "Salad - Chickpeas Salad",
    "Salad - Green Salad",
    "Salad - Tuna Salad",
    "Snack - Aloha",
    "Snack - Breakfast",
    "Snack - Chicken Pesto",
    "Snack - Pizza Panino",
    "Snack - Tuna Melt Chive",
    "Snack - Vegan",
];

pub fn rules() -> Vec<Rule> {
    WANTED_ITEMS
        .iter()
        .map(|&item| Rule::option(Term::first(item)))
        .collect()
}

#[tracing::instrument(level = "info", skip_all)]
pub fn extract(table: &Table) -> ExtractionResult {
    let cols = Columns {
        label: resolve(table, &ITEM),
        group: None,
        value: resolve(table, &SOLD),
    };
    let mut out = ExtractionResult::default();
    apply(&rules(), table, &cols, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::MetricValue;
    use crate::table::Cell;

    fn summary(rows: Vec<Vec<Cell>>) -> Table {
        Table::new(&["Item Name", "Items Sold", "Gross Sales"], rows)
    }

    #[test]
    fn test_sold_column_found_by_name() {
        let t = summary(vec![vec!["Snack - Vegan".into(), "12".into(), "1,800".into()]]);
        assert_eq!(extract(&t).get("snack - vegan"), Some(&MetricValue::Number(12.0)));
    }

    #[test]
    fn test_zero_sold_is_absent() {
        let t = summary(vec![vec!["Combo S1".into(), Cell::Number(0.0), "0".into()]]);
        assert!(extract(&t).get("combo s1").is_none());
    }

    #[test]
    fn test_case_insensitive_exact_name() {
        let t = summary(vec![
            vec!["REGULAR - TUNA MELT CHIVE".into(), "3".into(), "".into()],
            vec!["Regular - Tuna Melt Chive (Promo)".into(), "9".into(), "".into()],
        ]);
        let r = extract(&t);
        assert_eq!(r.get("regular - tuna melt chive"), Some(&MetricValue::Number(3.0)));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_sold_column_falls_back_to_last() {
        let t = Table::new(
            &["Product", "Qty"],
            vec![vec!["Sandwich Sampler".into(), "4".into()]],
        );
        assert_eq!(extract(&t).get("sandwich sampler"), Some(&MetricValue::Number(4.0)));
    }

    #[test]
    fn test_catalog_keys_are_lowercase() {
        let rules = rules();
        assert_eq!(rules.len(), 20);
        assert!(rules.iter().all(|r| r.keys[0] == r.keys[0].to_lowercase()));
    }
}
