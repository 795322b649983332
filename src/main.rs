mod columns;
mod config;
mod error;
mod heuristics;
mod loader;
mod matcher;
mod table;
mod template;
mod template_db;
mod uploads;

use clap::{Parser, Subcommand};
use config::{Config, TemplateBackend};
use std::path::PathBuf;
use template::{CsvTemplateStore, Template, TemplateStore, load_or_empty};
use template_db::SqliteTemplateStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uploads::UploadSet;

/// Fill branch report templates from daily POS exports
#[derive(Parser, Debug)]
#[command(name = "pos_encoder")]
#[command(version)]
struct Args {
    /// Config file
    #[arg(long, default_value = ".config/pos_encoder.toml", env = "POS_ENCODER_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract metrics from the four daily exports and fill the branch template
    Extract {
        #[arg(short, long)]
        branch: String,
        /// Print the raw metric mapping as JSON instead of the filled template
        #[arg(long)]
        json: bool,
        /// modifier-sales-*, item-sales-summary-*, discounts-*, payment-type-sales-*
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Inspect or edit stored templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
    /// Register a new branch code in the config file
    AddBranch { code: String },
}

#[derive(Subcommand, Debug)]
enum TemplateAction {
    /// Print a branch template
    Show {
        #[arg(short, long)]
        branch: String,
    },
    /// List branches with a stored template
    List,
    /// Replace a branch template with the rows of a two-column file
    Import {
        #[arg(short, long)]
        branch: String,
        file: PathBuf,
    },
    /// Set one item's default value, adding the item if needed
    Set {
        #[arg(short, long)]
        branch: String,
        #[arg(long)]
        item: String,
        #[arg(long, default_value = "")]
        value: String,
    },
}

fn open_store(cfg: &Config) -> Result<Box<dyn TemplateStore>, Box<dyn std::error::Error>> {
    let store: Box<dyn TemplateStore> = match cfg.templates.backend {
        TemplateBackend::Csv => Box::new(CsvTemplateStore::new(&cfg.templates.dir)?),
        TemplateBackend::Sqlite => Box::new(SqliteTemplateStore::new(&cfg.templates.db_path)?),
    };
    Ok(store)
}

fn print_template(template: &Template) {
    for row in &template.rows {
        println!("{}\t{}", row.item, row.value);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let cfg = Config::load_or_default(&args.config)?;

    // init tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_filter));
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Extract {
            branch,
            json,
            files,
        } => {
            let branch = cfg.branch(&branch)?;
            let uploads = UploadSet::classify(&files)?;
            info!(branch = %branch, date = ?uploads.report_date(), "All 4 files present");

            let sources = uploads.load()?;
            let result = heuristics::extract_all(&sources, branch);
            if result.is_empty() {
                warn!(branch = %branch, "No metrics found in any export");
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            let store = open_store(&cfg)?;
            let template = load_or_empty(store.as_ref(), branch);
            if template.is_empty() {
                warn!(branch = %branch, "Template is empty or could not be loaded");
            }
            print_template(&template.fill(&result));
        }

        Command::Template { action } => {
            let store = open_store(&cfg)?;
            match action {
                TemplateAction::Show { branch } => {
                    let branch = cfg.branch(&branch)?;
                    print_template(&load_or_empty(store.as_ref(), branch));
                }
                TemplateAction::List => {
                    for branch in store.branches()? {
                        println!("{branch}");
                    }
                }
                TemplateAction::Import { branch, file } => {
                    let branch = cfg.branch(&branch)?;
                    let template = Template::import(&file)?;
                    store.save(branch, &template)?;
                    info!(branch = %branch, rows = template.rows.len(), "Template imported");
                }
                TemplateAction::Set {
                    branch,
                    item,
                    value,
                } => {
                    let branch = cfg.branch(&branch)?;
                    let mut template = store.load(branch)?;
                    template.set(&item, &value);
                    store.save(branch, &template)?;
                }
            }
        }

        Command::AddBranch { code } => {
            if Config::add_branch(&args.config, &code)? {
                info!(code = %code, path = %args.config.display(), "Branch added");
            } else {
                info!(code = %code, "Branch already configured");
            }
        }
    }

    Ok(())
}
