use super::ExtractionResult;
use super::rules::{Columns, Rule, Term, apply};
use crate::columns::{ColumnHint, ColumnRole, Fallback, resolve};
use crate::table::Table;

const OPTION: ColumnRole = ColumnRole::hinted(ColumnHint::AnyOf(&["option"]), Fallback::First);
const GROUP: ColumnRole = ColumnRole::hinted(ColumnHint::AnyOf(&["modifier"]), Fallback::Index(1));
const QUANTITY: ColumnRole =
    ColumnRole::hinted(ColumnHint::AnyOf(&["quantity", "sold"]), Fallback::Last);

const ADD_ONS: &str = "choose your add-ons";
const SPREAD: &str = "choose your spread";

/// Options counted one-for-one under their own lowercased name.
#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub options: &'static [&'static str],
    /// Substring the modifier group must contain, if any.
    pub group: Option<&'static str>,
}

pub const CATEGORIES: &[Category] = &[
    // bread
    Category {
        options: &["Ciabatta", "Brioche", "Multigrain"],
        group: Some("choose your grain"),
    },
    // veggies
    Category {
        options: &["Cucumber", "Lettuce", "Tomato", "White Onion"],
        group: Some("choose your veggies"),
    },
    // protein
    Category {
        options: &[
            "Bacon",
            "Beef Salami",
            "Ham",
            "Honey Ham",
            "Italian Chicken",
            "Tuna Flakes",
            "Chickpeas",
        ],
        group: Some("choose your meat"),
    },
    // cheese
    Category {
        options: &["Cheddar", "Mozzarella", "Two Cheese"],
        group: Some("choose your cheese"),
    },
    // sauce
    Category {
        options: &[
            "Balsamic Vinaigrette",
            "Cream Cheese & Chive",
            "Garlic Ranch",
            "Honey Mustard",
            "Pesto Cream",
            "Ultimate Aioli",
        ],
        group: Some(SPREAD),
    },
    // spread-extra
    Category {
        options: &["Marinara", "Strawberry Jam", "Peanut Butter"],
        group: Some(SPREAD),
    },
    // add-on
    Category {
        options: &["Mushroom", "Pickles", "Sriracha", "Pineapple"],
        group: Some(ADD_ONS),
    },
    // coffee
    Category {
        options: &[
            "Hot Americano",
            "Hot Latte",
            "Hot Cappuccino",
            "Hot Caramel Macchiato",
            "Iced Americano",
            "Iced Latte",
            "Iced Cappuccino",
            "Iced Caramel Macchiato",
        ],
        group: None,
    },
    // smoothies
    Category {
        options: &["Golden Boost", "Green Detox", "Pink Glow"],
        group: Some("smoothies"),
    },
];

/// Sauces also tallied separately when used on salads.
pub const SALAD_SAUCES: &[&str] = &["Balsamic Vinaigrette", "Garlic Ranch", "Honey Mustard"];

/// CHMM sells its own water SKU; it fills both the generic and the
/// branch-specific field.
fn water_rule(branch: &str) -> Rule {
    if branch.trim().eq_ignore_ascii_case("chmm") {
        Rule::new("water", vec![Term::first("Water CHMM")]).also_as("water chmm")
    } else {
        Rule::new("water", vec![Term::first("Water")])
    }
}

pub fn rules(branch: &str) -> Vec<Rule> {
    let mut rules: Vec<Rule> = CATEGORIES
        .iter()
        .flat_map(|cat| {
            cat.options.iter().map(move |&option| {
                let term = Term::first(option);
                Rule::option(match cat.group {
                    Some(group) => term.within(group),
                    None => term,
                })
            })
        })
        .collect();

    rules.push(Rule::new(
        "egg",
        vec![
            Term::sum("Boiled Egg").within(ADD_ONS),
            Term::sum("Scrambled Egg").within(ADD_ONS),
        ],
    ));
    rules.push(water_rule(branch));
    rules.push(Rule::new(
        "softdrinks",
        vec![
            Term::first("Coke Regular"),
            Term::first("Coke Zero"),
            Term::first("Sprite"),
        ],
    ));
    rules.extend(SALAD_SAUCES.iter().map(|&sauce| {
        Rule::new(
            format!("salad - {}", sauce.to_lowercase()),
            vec![Term::sum(sauce).within("salad")],
        )
    }));
    rules
}

#[tracing::instrument(level = "info", skip(table))]
pub fn extract(table: &Table, branch: &str) -> ExtractionResult {
    let cols = Columns {
        label: resolve(table, &OPTION),
        group: Some(resolve(table, &GROUP)),
        value: resolve(table, &QUANTITY),
    };
    let mut out = ExtractionResult::default();
    apply(&rules(branch), table, &cols, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::MetricValue;

    fn sales(rows: &[(&str, &str, &str)]) -> Table {
        Table::new(
            &["Option Name", "Modifier Name", "Quantity Sold"],
            rows.iter()
                .map(|(opt, group, qty)| vec![(*opt).into(), (*group).into(), (*qty).into()])
                .collect(),
        )
    }

    fn qty(r: &ExtractionResult, key: &str) -> Option<f64> {
        match r.get(key) {
            Some(MetricValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    #[test]
    fn test_option_needs_matching_group() {
        let t = sales(&[
            ("Ham", "Add Extra Meat", "8"),
            ("Ham", "Choose your Meat", "5"),
            ("Tomato", "Choose your Veggies", "0"),
        ]);
        let r = extract(&t, "AC");
        assert_eq!(qty(&r, "ham"), Some(5.0));
        assert!(r.get("tomato").is_none());
    }

    #[test]
    fn test_salad_sauce_namespace() {
        let t = sales(&[("Garlic Ranch", "Choose your Spread - Salad Combo", "3")]);
        let r = extract(&t, "AC");
        assert_eq!(qty(&r, "salad - garlic ranch"), Some(3.0));
        assert_eq!(qty(&r, "garlic ranch"), Some(3.0));

        let t = sales(&[
            ("Garlic Ranch", "Salad Dressing", "2"),
            ("Garlic Ranch", "Salad Combo Dressing", "4"),
        ]);
        let r = extract(&t, "AC");
        assert_eq!(qty(&r, "salad - garlic ranch"), Some(6.0));
        assert!(r.get("garlic ranch").is_none());
    }

    #[test]
    fn test_egg_sums_both_options() {
        let t = sales(&[
            ("Boiled Egg", "Choose your Add-Ons", "2"),
            ("Boiled Egg", "Choose your Add-Ons (Snack)", "1"),
            ("Scrambled Egg", "Choose your Add-Ons", "4"),
            ("Scrambled Egg", "Breakfast Sides", "10"),
        ]);
        assert_eq!(qty(&extract(&t, "AC"), "egg"), Some(7.0));
    }

    #[test]
    fn test_softdrinks_combined() {
        let t = sales(&[
            ("Coke Regular", "Drinks", "3"),
            ("Sprite", "Combo Drink", "2"),
        ]);
        let r = extract(&t, "SMS");
        assert_eq!(qty(&r, "softdrinks"), Some(5.0));
        assert!(r.get("sprite").is_none());
    }

    #[test]
    fn test_coffee_has_no_group_constraint() {
        let t = sales(&[("Iced Latte", "Anything", "6"), ("Hot Latte", "Drinks", "0")]);
        let r = extract(&t, "AC");
        assert_eq!(qty(&r, "iced latte"), Some(6.0));
        assert!(r.get("hot latte").is_none());
    }

    #[test]
    fn test_water_depends_on_branch() {
        let t = sales(&[("Water", "Drinks", "2"), ("Water CHMM", "Drinks", "9")]);

        let chmm = extract(&t, "chmm");
        assert_eq!(qty(&chmm, "water"), Some(9.0));
        assert_eq!(qty(&chmm, "water chmm"), Some(9.0));

        let ac = extract(&t, "AC");
        assert_eq!(qty(&ac, "water"), Some(2.0));
        assert!(ac.get("water chmm").is_none());
    }

    #[test]
    fn test_smoothies_need_smoothie_group() {
        let t = sales(&[
            ("Green Detox", "Drinks", "9"),
            ("Green Detox", "Smoothies (16oz)", "4"),
            ("Pink Glow", "Choose your Smoothies", "2"),
        ]);
        let r = extract(&t, "AC");
        assert_eq!(qty(&r, "green detox"), Some(4.0));
        assert_eq!(qty(&r, "pink glow"), Some(2.0));
        assert!(r.get("golden boost").is_none());
    }

    #[test]
    fn test_spread_extras() {
        let t = sales(&[
            ("Marinara", "Choose your Spread", "3"),
            ("Strawberry Jam", "Choose your Spread (Snack)", "1"),
            ("Peanut Butter", "Choose your Spread", "2"),
            ("Peanut Butter", "Choose your Add-Ons", "7"),
        ]);
        let r = extract(&t, "AC");
        assert_eq!(qty(&r, "marinara"), Some(3.0));
        assert_eq!(qty(&r, "strawberry jam"), Some(1.0));
        assert_eq!(qty(&r, "peanut butter"), Some(2.0));
    }

    #[test]
    fn test_pineapple_is_an_add_on() {
        let t = sales(&[("Pineapple", "Choose your Add-Ons", "5")]);
        assert_eq!(qty(&extract(&t, "AC"), "pineapple"), Some(5.0));

        let t = sales(&[("Pineapple", "Choose your Spread", "5")]);
        assert!(extract(&t, "AC").get("pineapple").is_none());
    }

    #[test]
    fn test_unparsable_quantity_is_dropped() {
        let t = sales(&[("Pickles", "Choose your Add-Ons", "lots")]);
        assert!(extract(&t, "AC").is_empty());
    }

    #[test]
    fn test_columns_resolved_by_fallback() {
        let t = Table::new(
            &["Label", "Group", "Count"],
            vec![vec!["Brioche".into(), "Choose your Grain".into(), "11".into()]],
        );
        assert_eq!(qty(&extract(&t, "AC"), "brioche"), Some(11.0));
    }

    #[test]
    fn test_rule_keys_are_unique() {
        let rules = rules("CHMM");
        let mut keys: Vec<&str> = rules.iter().flat_map(|r| r.keys.iter().map(String::as_str)).collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }
}
