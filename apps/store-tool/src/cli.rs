use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML config file; environment overrides apply on top
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding `<table>.json` seed files
    #[arg(long, global = true)]
    pub seed_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the row count of every table
    Summary,

    /// Count rows per distinct value of a column
    Group {
        /// Table to group
        #[arg(short, long)]
        table: String,

        /// Column whose values form the groups
        #[arg(short, long)]
        column: String,
    },

    /// Print every schema and row as pretty JSON
    Dump,

    /// Rerun the validation rules of every model and report failures
    Validate,
}
