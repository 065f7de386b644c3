use serde::Serialize;
use serde_json::Value;
use soda_core::{QueryParameters, ResponseMetadata, RetrieveOptions, SourcesConfig};

use crate::cli::FetchArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct FetchResponseData<'a> {
    dataset: &'a str,
    query: &'a QueryParameters,
    row_count: Option<usize>,
    data: Value,
    meta: ResponseMetadata,
}

pub async fn run(
    args: &FetchArgs,
    config: &SourcesConfig,
    options: RetrieveOptions,
) -> Result<Value, CliError> {
    let query = build_query(args)?;
    let source = config.socrata_source(&args.dataset)?;

    let mut options = options.with_stream(args.stream);
    if args.no_details {
        options = options.without_details();
    }

    let dataset = source.retrieve(Some(query.clone()), options).await?;
    let row_count = dataset.row_count();

    Ok(serde_json::to_value(FetchResponseData {
        dataset: &args.dataset,
        query: &query,
        row_count,
        data: dataset.rows,
        meta: dataset.metadata,
    })?)
}

fn build_query(args: &FetchArgs) -> Result<QueryParameters, CliError> {
    let mut builder = QueryParameters::builder();
    if let Some(select) = &args.select {
        builder = builder.select(select);
    }
    if let Some(filter) = &args.filter {
        builder = builder.filter(filter);
    }
    if let Some(order) = &args.order {
        builder = builder.order(order);
    }
    if let Some(group) = &args.group {
        builder = builder.group(group);
    }
    if let Some(having) = &args.having {
        builder = builder.having(having);
    }
    if let Some(limit) = args.limit {
        builder = builder.limit(limit.to_string());
    }
    if let Some(offset) = args.offset {
        builder = builder.offset(offset.to_string());
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> FetchArgs {
        FetchArgs {
            dataset: String::from("accidentalidad_baq"),
            select: None,
            filter: None,
            order: Some(String::from("fecha_accidente ASC")),
            group: None,
            having: None,
            limit: None,
            offset: Some(1000),
            no_details: false,
            stream: false,
        }
    }

    #[test]
    fn only_given_flags_reach_the_wire() {
        let query = build_query(&args()).expect("valid query");
        assert_eq!(query.wire_keys(), vec!["$select", "$order", "$offset"]);
        assert_eq!(query.offset(), Some("1000"));
    }

    #[test]
    fn blank_flag_is_a_validation_error() {
        let mut args = args();
        args.filter = Some(String::from(" "));
        let error = build_query(&args).expect_err("blank where");
        assert_eq!(error.exit_code(), 2);
    }
}
