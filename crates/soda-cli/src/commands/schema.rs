use serde::Serialize;
use serde_json::Value;
use soda_core::{HttpDate, QueryParameters, RetrieveOptions, Schema, SourcesConfig};

use crate::error::CliError;

#[derive(Debug, Serialize)]
struct SchemaResponseData<'a> {
    dataset: &'a str,
    content_last_modified: HttpDate,
    schema: Schema,
}

/// Fetches a single row; the schema travels in the headers.
pub async fn run(
    dataset: &str,
    config: &SourcesConfig,
    options: RetrieveOptions,
) -> Result<Value, CliError> {
    let source = config.socrata_source(dataset)?;
    let query = QueryParameters::builder().limit("1").build()?;

    source.retrieve(Some(query), options.without_details()).await?;

    Ok(serde_json::to_value(SchemaResponseData {
        dataset,
        content_last_modified: source.content_last_modified()?,
        schema: source.schema()?,
    })?)
}
