//! Console entry point for the employee directory.
//!
//! # Responsibility
//! - Resolve database and logging settings from flags, env and config file.
//! - Drive the insert/list/search menu against `empdir_core`.

mod console;

use clap::Parser;
use console::{Console, MenuChoice};
use empdir_core::{default_log_level, init_logging, DbConfig, DirectoryService};
use log::info;
use std::error::Error;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "empdir", version, about = "Console employee directory")]
struct Cli {
    /// SQLite database file, or `:memory:` for a throwaway database.
    /// Takes precedence over `EMPDIR_DB_PATH` and the config file.
    #[arg(long)]
    db: Option<String>,

    /// TOML file with a `[database]` section.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long)]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let config = resolve_config(&cli)?;
    info!(
        "event=cli_start module=cli status=ok location={:?}",
        config.location
    );

    let mut service = DirectoryService::new(config);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock());

    loop {
        match console.main_menu()? {
            MenuChoice::Insert => console.insert_employee(&mut service)?,
            MenuChoice::List => console.list_employees(&mut service)?,
            MenuChoice::Search => console.search_employees(&mut service)?,
            MenuChoice::Quit => break,
        }
    }

    info!("event=cli_exit module=cli status=ok");
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<DbConfig, Box<dyn Error>> {
    let base = match cli.config.as_ref() {
        Some(path) => DbConfig::load(path)?,
        None => DbConfig::file("empdir.db"),
    };
    Ok(base
        .with_env_overrides()
        .with_path_override(cli.db.as_deref()))
}
