use crate::output::{OutputMode, pretty_kv, render};
use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use sheetrack_core::config::DEFAULT_PROJECT_CONFIG;
use sheetrack_core::db;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite `config.toml` even if `.sheetrack/` already exists.
    #[arg(long)]
    pub force: bool,
}

const GITIGNORE: &str = "sheetrack.db\nsheetrack.db-wal\nsheetrack.db-shm\n";

#[derive(Debug, Serialize)]
struct InitReport {
    root: String,
    database: String,
    config: String,
}

/// Execute `sk init`. Creates the project skeleton:
///
/// ```text
/// .sheetrack/
///   config.toml         (default project config template)
///   sheetrack.db        (migrated SQLite store)
///   .gitignore          (database and WAL files)
/// ```
///
/// # Errors
///
/// Returns an error if `.sheetrack/` already exists and `--force` is not set,
/// or if any filesystem or store operation fails.
pub fn run_init(args: &InitArgs, project_root: &Path, output: OutputMode) -> Result<()> {
    let store_dir = project_root.join(db::STORE_DIR);

    if store_dir.exists() && !args.force {
        anyhow::bail!(
            "{}/ already exists. Use `sk init --force` to reinitialize.",
            db::STORE_DIR
        );
    }

    std::fs::create_dir_all(&store_dir)
        .with_context(|| format!("Failed to create {}", store_dir.display()))?;

    let config_path = store_dir.join("config.toml");
    std::fs::write(&config_path, DEFAULT_PROJECT_CONFIG)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let gitignore_path = store_dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    let db_path = db::db_path(project_root);
    db::open_store(&db_path)?;
    tracing::info!(root = %project_root.display(), "project initialized");

    let report = InitReport {
        root: project_root.display().to_string(),
        database: db_path.display().to_string(),
        config: config_path.display().to_string(),
    };
    render(output, &report, |r, w| {
        writeln!(w, "✓ Initialized {}/ project structure.", db::STORE_DIR)?;
        writeln!(w)?;
        pretty_kv(w, "Database", &r.database)?;
        pretty_kv(w, "Config", &r.config)?;
        writeln!(w)?;
        writeln!(w, "Next steps:")?;
        writeln!(w, "  Add admin emails to [access].admin_emails in config.toml, then:")?;
        writeln!(w, "    sk --user <uid> --email <address> login")?;
        writeln!(w, "    sk create sheet --title \"Blind 75\"")
    })
}
