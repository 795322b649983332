use crate::error::Result;
use crate::template::{Template, TemplateRow, TemplateStore};
use rusqlite::{Connection, params};
use std::path::Path;
use tracing::info;

/// Branch templates kept in a single SQLite file.
pub struct SqliteTemplateStore {
    conn: Connection,
}

impl SqliteTemplateStore {
    /// Open (or create) the template database
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS template_rows (
                branch TEXT NOT NULL,
                position INTEGER NOT NULL,
                item TEXT NOT NULL,
                value TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (branch, position)
            )",
            [],
        )?;

        info!("Template database initialized");
        Ok(Self { conn })
    }
}

fn branch_key(branch: &str) -> String {
    branch.trim().to_uppercase()
}

impl TemplateStore for SqliteTemplateStore {
    fn load(&self, branch: &str) -> Result<Template> {
        let mut stmt = self.conn.prepare(
            "SELECT item, value FROM template_rows
             WHERE branch = ?1
             ORDER BY position",
        )?;

        let rows = stmt.query_map(params![branch_key(branch)], |row| {
            Ok(TemplateRow {
                item: row.get(0)?,
                value: row.get(1)?,
            })
        })?;

        let rows = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        info!(branch = %branch, rows = rows.len(), "Template loaded");
        Ok(Template { rows })
    }

    /// Replace the branch's rows in one transaction
    fn save(&self, branch: &str, template: &Template) -> Result<()> {
        let key = branch_key(branch);
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM template_rows WHERE branch = ?1", params![key])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO template_rows (branch, position, item, value)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (pos, row) in template.rows.iter().enumerate() {
                stmt.execute(params![key, pos as i64, row.item, row.value])?;
            }
        }
        tx.commit()?;
        info!(branch = %key, rows = template.rows.len(), "Template saved");
        Ok(())
    }

    fn branches(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT branch FROM template_rows ORDER BY branch")?;
        let branches = stmt.query_map([], |row| row.get(0))?;
        Ok(branches.collect::<rusqlite::Result<Vec<String>>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn template(items: &[(&str, &str)]) -> Template {
        Template {
            rows: items
                .iter()
                .map(|(i, v)| TemplateRow::new(*i, *v))
                .collect(),
        }
    }

    #[test]
    fn test_save_replaces_whole_template() {
        let store = SqliteTemplateStore::in_memory().unwrap();
        store
            .save("CHMM", &template(&[("Water", ""), ("Water CHMM", ""), ("Ham", "")]))
            .unwrap();
        store.save("chmm", &template(&[("Ham", "1")])).unwrap();

        assert_eq!(store.load("CHMM").unwrap(), template(&[("Ham", "1")]));
        assert_eq!(store.branches().unwrap(), vec!["CHMM".to_string()]);
    }

    #[test]
    fn test_order_is_preserved() {
        let store = SqliteTemplateStore::in_memory().unwrap();
        let t = template(&[("Zucchini", ""), ("Apple", ""), ("Mango", "2")]);
        store.save("AC", &t).unwrap();
        assert_eq!(store.load("AC").unwrap(), t);
        assert!(store.load("SMS").unwrap().is_empty());
    }

    #[test]
    fn test_schema_holds_only_template_fields() {
        let store = SqliteTemplateStore::in_memory().unwrap();
        let mut stmt = store.conn.prepare("PRAGMA table_info(template_rows)").unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(1))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(columns, ["branch", "position", "item", "value"]);
    }

    #[test]
    fn test_persists_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("templates.db");
        {
            let store = SqliteTemplateStore::new(&path).unwrap();
            store.save("SMS", &template(&[("GCash", "")])).unwrap();
        }
        let store = SqliteTemplateStore::new(&path).unwrap();
        assert_eq!(store.load("SMS").unwrap(), template(&[("GCash", "")]));
    }
}
