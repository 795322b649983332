// src/heuristics/mod.rs

mod discount;
mod items;
mod modifiers;
mod payment;
pub mod rules;

use crate::table::{Table, format_number};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, info_span, warn};

/// A single extracted metric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Number(f64),
    /// Row was found but its amount could not be read.
    Blank,
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => f.write_str(&format_number(*n)),
            MetricValue::Blank => Ok(()),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetricValue::Number(n) => serializer.serialize_f64(*n),
            MetricValue::Blank => serializer.serialize_str(""),
        }
    }
}

/// Metric name → value. Keys are stored trimmed and lowercased.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    values: BTreeMap<String, MetricValue>,
}

impl ExtractionResult {
    /// Insert a metric, overwriting any earlier value for the same key.
    pub fn insert(&mut self, key: &str, value: MetricValue) -> Option<MetricValue> {
        self.values.insert(key.trim().to_lowercase(), value)
    }

    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.values.get(&key.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fold `other` into `self`. Extractors own disjoint key sets, so a
    /// collision is reported; the incoming value still wins.
    pub fn merge(&mut self, other: ExtractionResult) {
        for (key, value) in other.values {
            if let Some(prev) = self.values.insert(key.clone(), value) {
                warn!(key = %key, previous = %prev, value = %value, "Metric key written by two extractors");
            }
        }
    }
}

/// The four loaded exports for one day.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub payment: Table,
    pub discount: Table,
    pub item: Table,
    pub modifier: Table,
}

/// Run every extractor and merge the results in a fixed order:
/// payment, discount, item, modifier.
pub fn extract_all(sources: &SourceTables, branch: &str) -> ExtractionResult {
    let span = info_span!("extract", branch = %branch);
    let _guard = span.enter();

    let mut result = ExtractionResult::default();
    result.merge(payment::extract(&sources.payment));
    result.merge(discount::extract(&sources.discount));
    result.merge(items::extract(&sources.item));
    result.merge(modifiers::extract(&sources.modifier, branch));

    info!(metrics = result.len(), "Extraction complete");
    result
}
