//! EmberKV CLI
//!
//! Thin demo layer over the embedded engine: opens the store in a data
//! directory and runs one command against it.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use emberkv::{Config, Engine};

/// EmberKV CLI
#[derive(Parser, Debug)]
#[command(name = "emberkv-cli")]
#[command(about = "CLI for the EmberKV embedded key-value store")]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./emberkv_data")]
    data_dir: String,

    /// Active-buffer entry limit before a flush is triggered
    #[arg(long, default_value_t = 4096)]
    buffer_limit: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Print store statistics
    Stats,
}

fn main() {
    let args = Args::parse();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .buffer_entry_limit(args.buffer_limit)
        .build();

    let engine = match Engine::open(config) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = run(&engine, &args.command);

    if let Err(e) = engine.close() {
        tracing::error!("close failed: {}", e);
    }

    if let Err(e) = outcome {
        tracing::error!("command failed: {}", e);
        std::process::exit(1);
    }
}

fn run(engine: &Engine, command: &Commands) -> emberkv::Result<()> {
    match command {
        Commands::Get { key } => {
            match engine.get(key.as_bytes())? {
                Some(value) => println!("{}", String::from_utf8_lossy(&value)),
                None => println!("(not found)"),
            }
        }
        Commands::Set { key, value } => {
            engine.put(key.as_bytes(), value.as_bytes())?;
            println!("OK");
        }
        Commands::Del { key } => {
            engine.delete(key.as_bytes())?;
            println!("OK");
        }
        Commands::Stats => {
            println!("data_dir:  {}", engine.data_dir().display());
            println!("buffered:  {}", engine.buffer_len()?);
            println!("segments:  {}", engine.segment_count());
            println!("journals:  {}", engine.journal_files()?.len());
        }
    }
    Ok(())
}
