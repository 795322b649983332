// src/uploads.rs

use crate::error::{EncoderError, Result};
use crate::heuristics::SourceTables;
use crate::loader::load_table;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The four daily POS exports, identified by file-name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    ModifierSales,
    ItemSalesSummary,
    Discounts,
    PaymentTypeSales,
}

impl ExportKind {
    pub const ALL: [ExportKind; 4] = [
        ExportKind::ModifierSales,
        ExportKind::ItemSalesSummary,
        ExportKind::Discounts,
        ExportKind::PaymentTypeSales,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            ExportKind::ModifierSales => "modifier-sales-",
            ExportKind::ItemSalesSummary => "item-sales-summary-",
            ExportKind::Discounts => "discounts-",
            ExportKind::PaymentTypeSales => "payment-type-sales-",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| name.starts_with(k.prefix()))
    }
}

/// Paths of one day's uploads, one per export kind.
#[derive(Debug, Clone)]
pub struct UploadSet {
    pub modifier: PathBuf,
    pub item: PathBuf,
    pub discount: PathBuf,
    pub payment: PathBuf,
}

impl UploadSet {
    /// Sort uploaded files by prefix. Exactly four files are required and
    /// every prefix must be present; for a repeated prefix the first file wins.
    pub fn classify<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        if paths.len() != 4 {
            return Err(EncoderError::MissingInput(format!(
                "expected exactly 4 files, got {}",
                paths.len()
            )));
        }

        let find = |kind: ExportKind| -> Option<PathBuf> {
            paths
                .iter()
                .map(|p| p.as_ref())
                .find(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .and_then(ExportKind::from_file_name)
                        == Some(kind)
                })
                .map(Path::to_path_buf)
        };

        let modifier = find(ExportKind::ModifierSales);
        let item = find(ExportKind::ItemSalesSummary);
        let discount = find(ExportKind::Discounts);
        let payment = find(ExportKind::PaymentTypeSales);

        match (modifier, item, discount, payment) {
            (Some(modifier), Some(item), Some(discount), Some(payment)) => {
                let set = Self {
                    modifier,
                    item,
                    discount,
                    payment,
                };
                set.check_dates();
                Ok(set)
            }
            _ => {
                let missing: Vec<&str> = ExportKind::ALL
                    .into_iter()
                    .filter(|k| find(*k).is_none())
                    .map(|k| k.prefix())
                    .collect();
                warn!(missing = ?missing, "Upload set incomplete");
                Err(EncoderError::MissingInput(format!(
                    "no file for {}",
                    missing.join(", ")
                )))
            }
        }
    }

    fn paths(&self) -> [&Path; 4] {
        [&self.modifier, &self.item, &self.discount, &self.payment]
    }

    /// Report date shared by the four file names, if they all carry one.
    pub fn report_date(&self) -> Option<String> {
        let dates: Vec<Option<String>> = self.paths().iter().map(|p| date_in_name(p)).collect();
        let first = dates.first()?.clone()?;
        dates
            .iter()
            .all(|d| d.as_deref() == Some(first.as_str()))
            .then_some(first)
    }

    /// Exports from different days are allowed through, but flagged.
    fn check_dates(&self) {
        let dates: Vec<Option<String>> = self.paths().iter().map(|p| date_in_name(p)).collect();
        let known: Vec<&String> = dates.iter().flatten().collect();
        if known.windows(2).any(|w| w[0] != w[1]) {
            warn!(dates = ?dates, "Uploads carry different report dates");
        }
    }

    /// Read all four exports.
    pub fn load(&self) -> Result<SourceTables> {
        info!("Loading upload set");
        Ok(SourceTables {
            payment: load_table(&self.payment)?,
            discount: load_table(&self.discount)?,
            item: load_table(&self.item)?,
            modifier: load_table(&self.modifier)?,
        })
    }
}

/// `YYYY-MM-DD` (or `YYYY_MM_DD`) embedded in a file name.
fn date_in_name(path: &Path) -> Option<String> {
    let re = Regex::new(r"(\d{4})[-_](\d{2})[-_](\d{2})").ok()?;
    let name = path.file_name()?.to_str()?;
    re.captures(name)
        .map(|c| format!("{}-{}-{}", &c[1], &c[2], &c[3]))
}
