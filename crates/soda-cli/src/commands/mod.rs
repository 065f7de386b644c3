mod datasets;
mod fetch;
mod schema;

use std::time::Duration;

use serde_json::Value;
use soda_core::{RetrieveOptions, SourcesConfig};
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let config_path = SourcesConfig::resolve_path(cli.config.as_deref());
    debug!(path = %config_path.display(), "loading dataset catalogue");
    let config = SourcesConfig::from_path(&config_path)?;

    let options = RetrieveOptions::default().with_timeout(Duration::from_millis(cli.timeout_ms));

    match &cli.command {
        Command::Fetch(args) => fetch::run(args, &config, options).await,
        Command::Schema(args) => schema::run(&args.dataset, &config, options).await,
        Command::Datasets => datasets::run(&config),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use tempfile::NamedTempFile;

    use super::*;

    fn cli_for(config: &NamedTempFile, command: &str) -> Cli {
        let path = config.path().to_string_lossy().into_owned();
        Cli::try_parse_from(["soda", "--config", path.as_str(), command]).expect("valid args")
    }

    #[tokio::test]
    async fn datasets_are_listed_from_config_flag() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"permits:\n  api_url: https://data.example.test/resource/abcd-1234.json\n")
            .expect("write config");

        let value = run(&cli_for(&file, "datasets")).await.expect("listing succeeds");
        assert_eq!(value[0]["name"], "permits");
        assert_eq!(
            value[0]["api_url"],
            "https://data.example.test/resource/abcd-1234.json"
        );
    }

    #[tokio::test]
    async fn invalid_catalogue_maps_to_config_exit_code() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"broken:\n  api_url: not a url\n")
            .expect("write config");

        let error = run(&cli_for(&file, "datasets")).await.expect_err("bad url");
        assert!(matches!(error, CliError::Config(_)));
        assert_eq!(error.exit_code(), 2);
    }
}
