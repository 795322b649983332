use crate::error::{EncoderError, Result};
use serde::Deserialize;
use std::{fs, path::Path};
use toml_edit::{Array, DocumentMut, value};

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_branches")]
    pub branches: Vec<String>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub templates: TemplateConfig,
}

fn default_branches() -> Vec<String> {
    vec!["AC".to_string(), "CHMM".to_string(), "SMS".to_string()]
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemplateBackend {
    #[default]
    Csv,
    Sqlite,
}

#[derive(Debug, Deserialize)]
pub struct TemplateConfig {
    #[serde(default)]
    pub backend: TemplateBackend,
    #[serde(default = "default_template_dir")]
    pub dir: String,
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_template_dir() -> String {
    "templates".to_string()
}

fn default_db_path() -> String {
    "templates/templates.db".to_string()
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            backend: TemplateBackend::default(),
            dir: default_template_dir(),
            db_path: default_db_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            branches: default_branches(),
            log_filter: default_log_filter(),
            templates: TemplateConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Canonical spelling of a configured branch code (case-insensitive lookup).
    pub fn branch(&self, code: &str) -> Result<&str> {
        self.branches
            .iter()
            .find(|b| b.eq_ignore_ascii_case(code.trim()))
            .map(String::as_str)
            .ok_or_else(|| EncoderError::UnknownBranch(code.to_string()))
    }

    /// Append a branch code to the config file in place, keeping the rest of
    /// the document untouched. Returns false if it was already listed.
    pub fn add_branch(path: impl AsRef<Path>, code: &str) -> Result<bool> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(EncoderError::Config("empty branch code".to_string()));
        }

        let content = if path.as_ref().exists() {
            fs::read_to_string(&path)?
        } else {
            String::new()
        };
        let mut doc = content.parse::<DocumentMut>()?;

        if doc.get("branches").is_none() {
            let defaults: Array = default_branches().iter().map(String::as_str).collect();
            doc["branches"] = value(defaults);
        }
        let branches = doc["branches"]
            .as_array_mut()
            .ok_or_else(|| EncoderError::Config("`branches` is not an array".to_string()))?;

        if branches
            .iter()
            .any(|b| b.as_str().is_some_and(|s| s.eq_ignore_ascii_case(&code)))
        {
            return Ok(false);
        }
        branches.push(code.as_str());

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&path, doc.to_string())?;
        Ok(true)
    }
}
