//! Command-line configuration.
//!
//! Arguments come from the command line; a `.env` file and the environment
//! fill in what was not given.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const METADATA_URL_ENV: &str = "DATASOURCE_METADATA_URL";
pub const OUTPUT_ENV: &str = "DATASOURCE_OUTPUT";

#[derive(Parser, Debug)]
#[command(name = "datasource-model")]
#[command(about = "Builds the canonical entity model from service metadata or an object library")]
pub struct Args {
    /// Path to the metadata document (service metadata or object library JSON)
    pub metadata: PathBuf,

    /// Where to write the model (default: stdout, or DATASOURCE_OUTPUT)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// URL the metadata was fetched from (or set DATASOURCE_METADATA_URL)
    #[arg(long)]
    pub url: Option<String>,

    /// Emit single-line JSON
    #[arg(long)]
    pub compact: bool,

    #[command(subcommand)]
    pub query: Option<Query>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Answer one classification question instead of printing the model
    Classify {
        /// root-entity, key, string, date, numeric, boolean, binary, guid, to-one, to-many
        predicate: String,

        /// Entity the question is about
        entity: String,

        /// Property or navigation name (not needed for root-entity)
        member: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub metadata: PathBuf,
    pub output: Option<PathBuf>,
    pub url: Option<String>,
    pub pretty: bool,
    pub query: Option<Query>,
}

impl Config {
    /// Merges parsed arguments with environment fallbacks.
    pub fn from_args(args: Args) -> Self {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    fn resolve(args: Args, env: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            metadata: args.metadata,
            output: args.output.or_else(|| env(OUTPUT_ENV).map(PathBuf::from)),
            url: args.url.or_else(|| env(METADATA_URL_ENV)),
            pretty: !args.compact,
            query: args.query,
        }
    }
}
