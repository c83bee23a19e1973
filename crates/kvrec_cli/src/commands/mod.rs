//! CLI command implementations.

pub mod crud;
pub mod inspect;
pub mod serve;

use kvrec_core::{Config, CoreError, Database, RequestAdapter, Schema};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A command that reads or writes records was run without `--path`.
    #[error("database path required (use --path <dir>)")]
    MissingPath,

    /// A `key=value` argument could not be parsed.
    #[error("invalid field `{0}` (expected key=value)")]
    InvalidField(String),

    /// JSON arguments could not be parsed.
    #[error("invalid JSON arguments: {0}")]
    Json(#[from] serde_json::Error),

    /// The engine rejected or failed the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A direct store call failed.
    #[error("storage error: {0}")]
    Storage(#[from] kvrec_storage::StorageError),

    /// The server failed.
    #[error(transparent)]
    Server(#[from] kvrec_server::ServerError),

    /// Runtime or terminal I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown output format.
    #[error("unknown format `{0}` (expected text or json)")]
    UnknownFormat(String),
}

/// An opened database plus the adapter used to run commands against it.
pub struct Session {
    path: PathBuf,
    adapter: RequestAdapter,
}

impl Session {
    /// Opens the database directory with `config`.
    pub fn open(path: &Path, config: &Config) -> CliResult<Self> {
        let db = Database::open_dir(path, config)?;
        Ok(Self {
            path: path.to_path_buf(),
            adapter: RequestAdapter::new(Arc::new(db), config.adapter),
        })
    }

    /// Returns the database directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the adapter.
    pub fn adapter(&self) -> &RequestAdapter {
        &self.adapter
    }

    /// Returns the database.
    pub fn database(&self) -> &Database {
        self.adapter.database()
    }
}

/// Loads the configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> CliResult<Config> {
    match path {
        Some(path) => Ok(Config::from_json_file(path)?),
        None => Ok(Config::default()),
    }
}

/// Parses `key=value` arguments into input fields of `schema`.
///
/// Each value is read as the declared type of its field, so
/// `completed=true` is a boolean while `text=123` stays a string.
/// Undeclared keys are passed through as strings for validation to
/// reject.
pub fn parse_fields(schema: &Schema, args: &[String]) -> CliResult<Map<String, Value>> {
    let mut fields = Map::new();
    for arg in args {
        let (key, raw) = arg
            .split_once('=')
            .ok_or_else(|| CliError::InvalidField(arg.clone()))?;
        if key.is_empty() {
            return Err(CliError::InvalidField(arg.clone()));
        }
        let value = match schema.field(key) {
            Some(field) => field.ty.parse_text(raw),
            None => Value::String(raw.to_owned()),
        };
        fields.insert(key.to_owned(), value);
    }
    Ok(fields)
}

/// Prints a JSON value to stdout.
pub fn print_json(value: &Value) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
