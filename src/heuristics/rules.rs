use super::{ExtractionResult, MetricValue};
use crate::matcher::{Aggregation, Lookup, RowQuery, aggregate};
use crate::table::Table;
use tracing::{debug, warn};

/// One row lookup contributing to a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    pub option: &'static str,
    /// Substring the group (modifier name) cell must contain.
    pub group: Option<&'static str>,
    pub aggregation: Aggregation,
}

impl Term {
    pub const fn first(option: &'static str) -> Self {
        Self {
            option,
            group: None,
            aggregation: Aggregation::First,
        }
    }

    pub const fn sum(option: &'static str) -> Self {
        Self {
            option,
            group: None,
            aggregation: Aggregation::Sum,
        }
    }

    pub const fn within(mut self, group: &'static str) -> Self {
        self.group = Some(group);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Keep,
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroPolicy {
    /// Drop the metric when it totals exactly zero.
    Suppress,
    Keep,
}

/// What a single-lookup rule stores when the matched cell is not numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnUnparsable {
    Omit,
    Blank,
}

/// How one metric is derived from a source table.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Output keys; every key receives the same value.
    pub keys: Vec<String>,
    /// Lookups whose values are added together.
    pub terms: Vec<Term>,
    pub sign: Sign,
    pub zeros: ZeroPolicy,
    pub unparsable: OnUnparsable,
}

impl Rule {
    pub fn new(key: impl Into<String>, terms: Vec<Term>) -> Self {
        Self {
            keys: vec![key.into()],
            terms,
            sign: Sign::Keep,
            zeros: ZeroPolicy::Suppress,
            unparsable: OnUnparsable::Omit,
        }
    }

    /// First-match lookup stored under the option's own lowercased name.
    pub fn option(term: Term) -> Self {
        Self::new(term.option.to_lowercase(), vec![term])
    }

    pub fn also_as(mut self, key: impl Into<String>) -> Self {
        self.keys.push(key.into());
        self
    }

    pub fn negated(mut self) -> Self {
        self.sign = Sign::Negate;
        self
    }

    pub fn keep_zero(mut self) -> Self {
        self.zeros = ZeroPolicy::Keep;
        self
    }

    pub fn blank_on_unparsable(mut self) -> Self {
        self.unparsable = OnUnparsable::Blank;
        self
    }
}

/// Resolved column positions a rule set runs against.
#[derive(Debug, Clone, Copy)]
pub struct Columns {
    pub label: usize,
    pub group: Option<usize>,
    pub value: usize,
}

/// Evaluate a rule. `None` means the metric is left out of the result.
pub fn evaluate(rule: &Rule, table: &Table, cols: &Columns) -> Option<MetricValue> {
    let mut total = 0.0;
    let mut found = false;

    for term in &rule.terms {
        let mut query = RowQuery::new(cols.label, term.option, cols.value);
        if let Some(needle) = term.group {
            let Some(group_col) = cols.group else {
                warn!(option = term.option, "Term needs a group column the table lacks");
                continue;
            };
            query = query.within(group_col, needle);
        }

        match aggregate(table, &query, term.aggregation) {
            Lookup::Value(v) => {
                total += v;
                found = true;
            }
            Lookup::Unparsable => {
                if rule.unparsable == OnUnparsable::Blank && rule.terms.len() == 1 {
                    return Some(MetricValue::Blank);
                }
            }
            Lookup::Missing => {}
        }
    }

    if !found {
        return None;
    }
    if rule.sign == Sign::Negate {
        total = -total;
    }
    if total == 0.0 {
        if rule.zeros == ZeroPolicy::Suppress {
            return None;
        }
        // no negative zero in the output
        total = 0.0;
    }
    Some(MetricValue::Number(total))
}

/// Evaluate every rule in order, writing hits into `out` (later rules win).
pub fn apply(rules: &[Rule], table: &Table, cols: &Columns, out: &mut ExtractionResult) {
    for rule in rules {
        if let Some(value) = evaluate(rule, table, cols) {
            for key in &rule.keys {
                debug!(key = %key, value = %value, "Metric extracted");
                out.insert(key, value);
            }
        }
    }
}
