use super::ExtractionResult;
use super::rules::{Columns, Rule, Term, apply};
use crate::columns::{ColumnRole, Fallback, resolve};
use crate::table::Table;

const NAME: ColumnRole = ColumnRole::fixed(Fallback::First);
const AMOUNT: ColumnRole = ColumnRole::fixed(Fallback::Last);

/// Discount rules. "special discounts" (gift certificates) and
/// "special discount" are separate template fields fed by separate rows.
pub fn rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "sc/pwd discounts",
            vec![Term::sum("Senior Citizen"), Term::sum("PWD")],
        )
        .negated(),
        Rule::new("special discounts", vec![Term::first("Gift Certificate")])
            .negated()
            .keep_zero(),
        Rule::new("special discount", vec![Term::first("Special Discount")])
            .negated()
            .keep_zero(),
    ]
}

#[tracing::instrument(level = "info", skip_all)]
pub fn extract(table: &Table) -> ExtractionResult {
    let cols = Columns {
        label: resolve(table, &NAME),
        group: None,
        value: resolve(table, &AMOUNT),
    };
    let mut out = ExtractionResult::default();
    apply(&rules(), table, &cols, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::MetricValue;

    fn discounts(rows: &[(&str, &str)]) -> Table {
        Table::new(
            &["Discount Name", "Times Applied", "Discount Amount"],
            rows.iter()
                .map(|(name, amt)| vec![(*name).into(), "1".into(), (*amt).into()])
                .collect(),
        )
    }

    #[test]
    fn test_senior_and_pwd_are_combined() {
        let r = extract(&discounts(&[("Senior Citizen", "100"), ("PWD", "50")]));
        assert_eq!(r.get("sc/pwd discounts"), Some(&MetricValue::Number(-150.0)));
    }

    #[test]
    fn test_zero_sc_pwd_is_dropped() {
        let r = extract(&discounts(&[("Senior Citizen", "0"), ("Employee", "20")]));
        assert!(r.get("sc/pwd discounts").is_none());
    }

    #[test]
    fn test_special_discount_keys_stay_distinct() {
        let r = extract(&discounts(&[
            ("Gift Certificate", "1,000"),
            ("Special Discount", "75.25"),
        ]));
        assert_eq!(r.get("special discounts"), Some(&MetricValue::Number(-1000.0)));
        assert_eq!(r.get("special discount"), Some(&MetricValue::Number(-75.25)));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_unparsable_gift_certificate_is_omitted() {
        let r = extract(&discounts(&[("Gift Certificate", "-")]));
        assert!(r.is_empty());
    }
}
