use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sqlbundle::cli::{run_bundle, run_compile, run_describe, run_list, run_resolve};

#[derive(Parser)]
#[command(name = "sqlbundle")]
#[command(about = "Bundle code modules into a SQLite database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bundle a directory of modules into a new database.
    ///
    /// The directory is typically produced by a package installer, for example
    /// `pip install --target=DIRECTORY -r requirements.txt`.
    Bundle {
        /// Directory to bundle
        directory: PathBuf,

        /// Database file to create
        database: PathBuf,

        /// TOML file overriding the file naming conventions
        #[arg(long)]
        layout: Option<PathBuf>,
    },

    /// Compile the source in an existing database.
    ///
    /// Compiled code only serves interpreters with the same magic number, so
    /// run this once per supported interpreter.
    Compile {
        /// Database file
        database: PathBuf,
    },

    /// Show information about a database
    Describe {
        /// Database file
        database: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the entries of a directory inside a database
    List {
        /// Database file
        database: PathBuf,

        /// Directory path; the root when omitted
        prefix: Option<String>,
    },

    /// Show how a module name resolves
    Resolve {
        /// Database file
        database: PathBuf,

        /// Dotted module name
        fullname: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("sqlbundle=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bundle {
            directory,
            database,
            layout,
        } => run_bundle(directory, database, layout)?,
        Commands::Compile { database } => run_compile(database)?,
        Commands::Describe { database, json } => run_describe(database, json)?,
        Commands::List { database, prefix } => {
            run_list(database, prefix.unwrap_or_default())?
        }
        Commands::Resolve { database, fullname } => run_resolve(database, fullname)?,
    }

    Ok(())
}
