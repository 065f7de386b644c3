//! CLI argument definitions for soda.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fetch` | Retrieve rows and metadata from a configured dataset |
//! | `schema` | Print a dataset's field types |
//! | `datasets` | List configured datasets |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | `$SODA_CONFIG` or `config/api_sources.yml` | Dataset catalogue |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `5000` | Request timeout in ms |
//!
//! # Examples
//!
//! ```bash
//! soda fetch accidentalidad_baq --order "fecha_accidente ASC" --offset 1000
//! soda fetch accidentalidad_baq --where "gravedad_accidente = 'Con muertos'" --limit 50 --pretty
//! soda schema accidentalidad_baq
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Pull Socrata Open Data datasets as JSON.
#[derive(Debug, Parser)]
#[command(name = "soda", author, version, about = "Socrata Open Data (SODA2) fetcher")]
pub struct Cli {
    /// Dataset catalogue (YAML mapping dataset name to `api_url`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Request timeout in milliseconds.
    #[arg(long, global = true, default_value_t = 5000)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Retrieve rows plus schema, freshness and request diagnostics.
    ///
    /// Pagination is manual: repeat with a larger --offset.
    Fetch(FetchArgs),

    /// Print the field → type mapping of a dataset.
    Schema(DatasetArg),

    /// List datasets in the catalogue.
    Datasets,
}

#[derive(Debug, Args)]
pub struct DatasetArg {
    /// Dataset name as configured in the catalogue.
    pub dataset: String,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Dataset name as configured in the catalogue.
    pub dataset: String,

    /// SoQL projection.
    #[arg(long)]
    pub select: Option<String>,

    /// SoQL filter predicate.
    #[arg(long = "where", value_name = "PREDICATE")]
    pub filter: Option<String>,

    /// SoQL sort expression, e.g. "id ASC".
    #[arg(long)]
    pub order: Option<String>,

    /// SoQL grouping expression.
    #[arg(long)]
    pub group: Option<String>,

    /// SoQL post-group filter.
    #[arg(long)]
    pub having: Option<String>,

    /// Maximum number of rows.
    #[arg(long)]
    pub limit: Option<u64>,

    /// Number of rows to skip.
    #[arg(long)]
    pub offset: Option<u64>,

    /// Skip elapsed time, server date and request id.
    #[arg(long, default_value_t = false)]
    pub no_details: bool,

    /// Read the response body incrementally.
    #[arg(long, default_value_t = false)]
    pub stream: bool,
}
