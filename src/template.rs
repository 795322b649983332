// src/template.rs

use crate::error::Result;
use crate::heuristics::ExtractionResult;
use crate::loader::load_table;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// One (Item, Value) line of a branch template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRow {
    #[serde(rename = "Item")]
    pub item: String,
    #[serde(rename = "Value", default)]
    pub value: String,
}

impl TemplateRow {
    pub fn new(item: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            value: value.into(),
        }
    }
}

/// Ordered list of fields a branch reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    pub rows: Vec<TemplateRow>,
}

impl Template {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Set the value of `item` (matched trimmed, case-insensitive), appending
    /// a new row when the item is not present.
    pub fn set(&mut self, item: &str, value: &str) {
        let wanted = item.trim().to_lowercase();
        match self
            .rows
            .iter_mut()
            .find(|r| r.item.trim().to_lowercase() == wanted)
        {
            Some(row) => row.value = value.to_string(),
            None => self.rows.push(TemplateRow::new(item.trim(), value)),
        }
    }

    /// Read (Item, Value) pairs from any two-column export. The first
    /// column is the item, the second (if any) the value.
    pub fn import(path: &Path) -> Result<Self> {
        let table = load_table(path)?;
        let rows = table
            .rows()
            .iter()
            .filter_map(|row| {
                let item = row.first()?.to_string();
                if item.trim().is_empty() {
                    return None;
                }
                let value = row.get(1).map(|c| c.to_string()).unwrap_or_default();
                Some(TemplateRow::new(item, value))
            })
            .collect();
        Ok(Self { rows })
    }

    /// Fill every row from `result`, keyed by the trimmed lowercased item.
    /// Rows without a metric get an empty value; metrics without a row are
    /// dropped.
    pub fn fill(&self, result: &ExtractionResult) -> Template {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let value = result
                    .get(&row.item)
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                TemplateRow::new(row.item.clone(), value)
            })
            .collect();
        Template { rows }
    }
}

/// Per-branch template persistence. Saves always rewrite the whole template.
pub trait TemplateStore {
    fn load(&self, branch: &str) -> Result<Template>;
    fn save(&self, branch: &str, template: &Template) -> Result<()>;
    /// Branch codes that have a stored template.
    fn branches(&self) -> Result<Vec<String>>;
}

/// Load a branch template, substituting an empty one when the stored copy
/// cannot be read so the caller can carry on.
pub fn load_or_empty(store: &dyn TemplateStore, branch: &str) -> Template {
    match store.load(branch) {
        Ok(t) => t,
        Err(e) => {
            error!(branch = %branch, error = %e, "Failed to load template");
            Template::default()
        }
    }
}

/// Templates stored as `<dir>/<BRANCH>.csv` with an `Item,Value` header.
pub struct CsvTemplateStore {
    dir: PathBuf,
}

impl CsvTemplateStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    fn path_for(&self, branch: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", branch.trim().to_uppercase()))
    }
}

impl TemplateStore for CsvTemplateStore {
    fn load(&self, branch: &str) -> Result<Template> {
        let path = self.path_for(branch);
        if !path.exists() {
            info!(path = %path.display(), "No stored template, starting empty");
            return Ok(Template::default());
        }

        let mut rdr = ReaderBuilder::new().flexible(true).from_path(&path)?;
        let rows = rdr
            .deserialize::<TemplateRow>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        info!(branch = %branch, rows = rows.len(), "Template loaded");
        Ok(Template { rows })
    }

    fn save(&self, branch: &str, template: &Template) -> Result<()> {
        let path = self.path_for(branch);
        let tmp = path.with_extension("csv.tmp");
        {
            let mut wtr = WriterBuilder::new().from_path(&tmp)?;
            // header row even for an empty template
            wtr.write_record(["Item", "Value"])?;
            for row in &template.rows {
                wtr.write_record([&row.item, &row.value])?;
            }
            wtr.flush()?;
        }
        fs::rename(&tmp, &path)?;
        info!(branch = %branch, rows = template.rows.len(), "Template saved");
        Ok(())
    }

    fn branches(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    out.push(stem.to_string());
                }
            }
        }
        out.sort();
        Ok(out)
    }
}
