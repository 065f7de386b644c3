use serde::Serialize;
use serde_json::Value;
use soda_core::SourcesConfig;

use crate::error::CliError;

#[derive(Debug, Serialize)]
struct DatasetEntry<'a> {
    name: &'a str,
    api_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

pub fn run(config: &SourcesConfig) -> Result<Value, CliError> {
    let entries: Vec<DatasetEntry<'_>> = config
        .iter()
        .map(|(name, dataset)| DatasetEntry {
            name,
            api_url: &dataset.api_url,
            description: dataset.description.as_deref(),
        })
        .collect();

    Ok(serde_json::to_value(entries)?)
}
