//! kvrec CLI
//!
//! Command-line access to a file-backed kvrec database.
//!
//! # Commands
//!
//! - `list`, `get`, `create`, `update`, `delete` - Collection operations
//! - `query` - Run a named operation with JSON arguments
//! - `inspect` - Show layouts and record counts per collection
//! - `serve` - Start the HTTP query server

mod commands;

use clap::{Parser, Subcommand};
use commands::{CliError, CliResult, Session};
use kvrec_core::CollectionName;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// kvrec command-line tools.
#[derive(Parser)]
#[command(name = "kvrec")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// JSON configuration file (layouts, namespaces, id strategies)
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every record of a collection
    List {
        /// Collection name (items, todos, users)
        collection: CollectionName,
    },

    /// Fetch one record by id
    Get {
        /// Collection name
        collection: CollectionName,
        /// Record id
        id: String,
    },

    /// Create a record from key=value fields
    Create {
        /// Collection name
        collection: CollectionName,
        /// Fields as key=value; values are parsed as JSON when possible
        fields: Vec<String>,
    },

    /// Patch a record with key=value fields
    Update {
        /// Collection name
        collection: CollectionName,
        /// Record id
        id: String,
        /// Fields as key=value; values are parsed as JSON when possible
        fields: Vec<String>,
    },

    /// Delete a record by id
    Delete {
        /// Collection name
        collection: CollectionName,
        /// Record id
        id: String,
    },

    /// Run a named operation such as `todos` or `createTodo`
    Query {
        /// Operation name
        operation: String,
        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        args: String,
    },

    /// Show layouts and record counts per collection
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Start the HTTP query server
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Allowed CORS origin (repeatable; any origin if omitted)
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    run(cli)?;
    Ok(())
}

fn run(cli: Cli) -> CliResult<()> {
    let config = commands::load_config(cli.config.as_deref())?;
    let path = cli.path;
    let session = || -> CliResult<Session> {
        let path = path.as_deref().ok_or(CliError::MissingPath)?;
        Session::open(path, &config)
    };

    match cli.command {
        Commands::List { collection } => {
            commands::crud::list(&session()?, collection)?;
        }
        Commands::Get { collection, id } => {
            commands::crud::get(&session()?, collection, &id)?;
        }
        Commands::Create { collection, fields } => {
            commands::crud::create(&session()?, collection, &fields)?;
        }
        Commands::Update {
            collection,
            id,
            fields,
        } => {
            commands::crud::update(&session()?, collection, &id, &fields)?;
        }
        Commands::Delete { collection, id } => {
            commands::crud::delete(&session()?, collection, &id)?;
        }
        Commands::Query { operation, args } => {
            commands::crud::query(&session()?, &operation, &args)?;
        }
        Commands::Inspect { format } => {
            commands::inspect::run(&session()?, &format)?;
        }
        Commands::Serve { bind, cors_origins } => {
            commands::serve::run(path.as_deref(), &config, bind, cors_origins)?;
        }
        Commands::Version => {
            println!("kvrec CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("kvrec Core v{}", kvrec_core::VERSION);
        }
    }

    Ok(())
}
