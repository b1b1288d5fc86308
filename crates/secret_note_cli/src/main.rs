//! Command-line front end for the secret note store.
//!
//! # Responsibility
//! - Map subcommands onto `NoteStore` operations.
//! - Print results as JSON and translate error kinds into exit codes.
//!
//! # Exit codes
//! - `0` success, `1` storage or setup failure, `2` validation, `3` not found.

use clap::{Parser, Subcommand};
use log::error;
use secret_note_core::{
    default_log_level, init_logging, open_store, ConfigError, NoteId, NoteRepository, NoteStore,
    NoteStoreError, OpenError, StoreConfig,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Store short notes encrypted at rest.
#[derive(Parser)]
#[command(name = "secret-note")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(global = true, long)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files
    #[arg(global = true, long)]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(global = true, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt and store a new note
    Create {
        /// Note content
        note: Option<String>,
    },

    /// List ids and creation times of all notes
    List,

    /// Show one note, decrypted unless --encrypted is given
    Get {
        id: NoteId,

        /// Print the stored ciphertext instead of the plaintext
        #[arg(short, long)]
        encrypted: bool,
    },

    /// Replace the content of one note
    Update {
        id: NoteId,

        /// New note content
        note: Option<String>,
    },

    /// Delete one note
    Delete { id: NoteId },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(err) => return report(&err),
    };

    if let Some(log_dir) = config.log_dir.as_ref() {
        if let Err(err) = init_logging(effective_log_level(&config), log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let store = match open_store(&config) {
        Ok(store) => store,
        Err(err) => {
            error!("event=cli_open module=cli status=error error={err}");
            return report(&CliError::from(err));
        }
    };

    match run(&store, cli.command) {
        Ok(Some(rendered)) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

/// Loads the config file and environment, then applies command-line flags.
fn resolve_config(cli: &Cli) -> Result<StoreConfig, CliError> {
    let mut config = StoreConfig::resolve(cli.config.as_deref())?;
    if let Some(db) = cli.db.clone() {
        config.database_path = db;
    }
    if let Some(dir) = cli.log_dir.clone() {
        config.log_dir = Some(dir);
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = Some(level);
    }
    Ok(config)
}

fn effective_log_level(config: &StoreConfig) -> &str {
    config.log_level.as_deref().unwrap_or(default_log_level())
}

/// Executes one subcommand and returns the JSON to print, if any.
fn run<R: NoteRepository>(
    store: &NoteStore<R>,
    command: Commands,
) -> Result<Option<String>, CliError> {
    let rendered = match command {
        Commands::Create { note } => {
            render(&store.create(note.as_deref().unwrap_or_default())?)?
        }
        Commands::List => render(&store.list_all()?)?,
        Commands::Get { id, encrypted } => render(&store.get_one(id, !encrypted)?)?,
        Commands::Update { id, note } => {
            render(&store.update(id, note.as_deref().unwrap_or_default())?)?
        }
        Commands::Delete { id } => {
            store.remove(id)?;
            return Ok(None);
        }
    };
    Ok(Some(rendered))
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error(transparent)]
    Store(#[from] NoteStoreError),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

fn render<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn report(err: &CliError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(exit_code(err))
}

fn exit_code(err: &CliError) -> u8 {
    match err {
        CliError::Store(NoteStoreError::Validation) => 2,
        CliError::Store(NoteStoreError::NotFound(_)) => 3,
        CliError::Store(NoteStoreError::Storage { .. })
        | CliError::Config(_)
        | CliError::Open(_)
        | CliError::Output(_) => 1,
    }
}
