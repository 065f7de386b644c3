//! Behavior-driven tests for the Socrata source against a mock SODA2 server.
//!
//! These tests verify HOW a caller experiences dataset retrieval over real
//! HTTP: what gets sent on the wire and what comes back as rows and metadata.

use std::time::Duration;

use serde_json::{json, Value};
use soda_core::{
    FetchOptions, HttpDataSource, QueryParameters, RetrieveOptions, SocrataSource,
    SourceErrorKind, StructuredDataSource,
};
use time::macros::datetime;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESOURCE: &str = "/resource/yb9r-2dsi.json";

fn rows(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|id| json!({ "id": id.to_string(), "barrio": format!("barrio-{id}") }))
            .collect(),
    )
}

fn soda_template(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(body)
        .insert_header("X-SODA2-Fields", r#"["id","barrio"]"#)
        .insert_header("X-SODA2-Types", r#"["number","text"]"#)
        .insert_header("X-SODA2-Truth-Last-Modified", "Wed, 21 Oct 2015 07:28:00 GMT")
        .insert_header("Date", "Mon, 06 May 2024 13:05:09 GMT")
        .insert_header("X-Socrata-RequestId", "f1d2e3c4b5a6")
}

fn endpoint(server: &MockServer) -> String {
    format!("{}{RESOURCE}", server.uri())
}

// =============================================================================
// Retrieval: happy path
// =============================================================================

#[tokio::test]
async fn when_ordered_page_is_requested_rows_and_schema_come_back() {
    // Given: A SODA2 resource serving ten ordered rows
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .and(query_param("$select", "*"))
        .and(query_param("$order", "id ASC"))
        .and(query_param("$limit", "10"))
        .and(query_param_is_missing("$where"))
        .and(query_param_is_missing("$offset"))
        .respond_with(soda_template(rows(10)))
        .expect(1)
        .mount(&server)
        .await;

    let source = SocrataSource::new(endpoint(&server)).expect("valid endpoint");
    let query = QueryParameters::builder()
        .order("id ASC")
        .limit("10")
        .build()
        .expect("valid query");

    // When: The caller retrieves the page
    let dataset = source
        .retrieve(Some(query), RetrieveOptions::default())
        .await
        .expect("retrieve should succeed");

    // Then: All ten rows arrive with a populated schema
    assert_eq!(dataset.row_count(), Some(10));
    assert_eq!(dataset.rows[3]["barrio"], "barrio-3");

    let schema = source.schema().expect("schema populated");
    assert_eq!(schema.len(), 2);
    assert_eq!(schema.type_of("id"), Some("number"));
    assert_eq!(schema.type_of("barrio"), Some("text"));
}

#[tokio::test]
async fn when_details_are_requested_all_diagnostics_are_populated() {
    // Given: A SODA2 resource
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(soda_template(rows(1)))
        .mount(&server)
        .await;
    let source = SocrataSource::new(endpoint(&server)).expect("valid endpoint");

    // When: Data is retrieved with default options
    source
        .retrieve(None, RetrieveOptions::default())
        .await
        .expect("retrieve should succeed");

    // Then: Freshness, encoding and diagnostics are all readable
    assert_eq!(
        source.content_last_modified().expect("freshness").into_inner(),
        datetime!(2015-10-21 07:28:00 UTC)
    );
    assert_eq!(
        source.request_date().expect("request date").into_inner(),
        datetime!(2024-05-06 13:05:09 UTC)
    );
    assert_eq!(source.request_id().expect("request id"), "f1d2e3c4b5a6");
    assert!(source.elapsed_time().is_ok());
    assert!(source.encoding().expect("encoding").is_some());
}

#[tokio::test]
async fn when_details_are_skipped_diagnostics_stay_unavailable() {
    // Given: A resource that omits Socrata's request id
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(rows(2))
                .insert_header("X-SODA2-Fields", r#"["id","barrio"]"#)
                .insert_header("X-SODA2-Types", r#"["number","text"]"#)
                .insert_header("X-SODA2-Truth-Last-Modified", "Wed, 21 Oct 2015 07:28:00 GMT"),
        )
        .mount(&server)
        .await;
    let source = SocrataSource::new(endpoint(&server)).expect("valid endpoint");

    // When: The caller opts out of response details
    let dataset = source
        .retrieve(None, RetrieveOptions::default().without_details())
        .await
        .expect("details are optional");

    // Then: Rows and schema are there, diagnostics are not
    assert_eq!(dataset.row_count(), Some(2));
    assert!(source.schema().is_ok());
    assert_eq!(
        source.elapsed_time().expect_err("not captured").kind(),
        SourceErrorKind::DetailsUnavailable
    );
    assert_eq!(
        source.request_id().expect_err("not captured").kind(),
        SourceErrorKind::DetailsUnavailable
    );
}

#[tokio::test]
async fn when_used_through_capability_traits_schema_follows_data() {
    // Given: A source seen only through its capabilities
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(soda_template(rows(4)))
        .mount(&server)
        .await;
    let source = SocrataSource::new(endpoint(&server)).expect("valid endpoint");

    async fn pull<S>(source: &S) -> (Value, usize)
    where
        S: StructuredDataSource<Request = Option<QueryParameters>>,
    {
        let rows = source.retrieve_data(None).await.expect("retrieve ok");
        let fields = StructuredDataSource::schema(source).expect("schema").len();
        (rows, fields)
    }

    // When: Data is pulled generically
    let (rows, fields) = pull(&source).await;

    // Then: Both capabilities are honored
    assert_eq!(rows.as_array().map(Vec::len), Some(4));
    assert_eq!(fields, 2);
}

#[tokio::test]
async fn when_streaming_is_enabled_payload_is_identical() {
    // Given: A resource with a handful of rows
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(soda_template(rows(25)))
        .mount(&server)
        .await;
    let source = SocrataSource::new(endpoint(&server)).expect("valid endpoint");

    // When: The body is streamed
    let dataset = source
        .retrieve(None, RetrieveOptions::default().with_stream(true))
        .await
        .expect("streamed retrieve ok");

    // Then: The decoded rows are complete
    assert_eq!(dataset.rows, rows(25));
}

#[tokio::test]
async fn when_field_names_are_not_ascii_schema_keeps_them() {
    // Given: A resource whose field list carries raw UTF-8 bytes
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(
            soda_template(json!([{ "año": "2024", "barrio": "El Prado" }]))
                .insert_header("X-SODA2-Fields", r#"["año","barrio"]"#.as_bytes())
                .insert_header("X-SODA2-Types", r#"["text","text"]"#),
        )
        .mount(&server)
        .await;
    let source = SocrataSource::new(endpoint(&server)).expect("valid endpoint");

    // When: Data is retrieved
    let dataset = source
        .retrieve(None, RetrieveOptions::default())
        .await
        .expect("header is present and well formed");

    // Then: The non-ASCII field survives into the schema
    assert_eq!(dataset.row_count(), Some(1));
    let schema = source.schema().expect("schema populated");
    assert_eq!(schema.type_of("año"), Some("text"));
    assert_eq!(schema.type_of("barrio"), Some("text"));
}

// =============================================================================
// Retrieval: failures
// =============================================================================

#[tokio::test]
async fn when_truth_header_is_missing_no_payload_is_returned() {
    // Given: A response lacking X-SODA2-Truth-Last-Modified
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(rows(3))
                .insert_header("X-SODA2-Fields", r#"["id","barrio"]"#)
                .insert_header("X-SODA2-Types", r#"["number","text"]"#),
        )
        .mount(&server)
        .await;
    let source = SocrataSource::new(endpoint(&server)).expect("valid endpoint");

    // When: Data is retrieved
    let result = source.retrieve(None, RetrieveOptions::default()).await;

    // Then: The call fails with a header-missing error
    let error = result.expect_err("freshness header is required");
    assert_eq!(error.kind(), SourceErrorKind::MissingHeader);
    assert!(error.message().contains("X-SODA2-Truth-Last-Modified"));
    assert!(source.last_metadata().is_none());
}

#[tokio::test]
async fn when_query_is_rejected_caller_sees_status_and_reason() {
    // Given: Socrata rejecting a malformed SoQL filter
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "query.soql.no-such-column",
            "error": true,
            "message": "No such column: nope"
        })))
        .mount(&server)
        .await;
    let source = SocrataSource::new(endpoint(&server)).expect("valid endpoint");
    let query = QueryParameters::builder()
        .filter("nope > 1")
        .build()
        .expect("valid query");

    // When: The query is sent
    let error = source
        .retrieve(Some(query), RetrieveOptions::default())
        .await
        .expect_err("400 must not look like success");

    // Then: The error names the status and the server's reason
    assert_eq!(error.kind(), SourceErrorKind::HttpStatus);
    assert!(error.message().contains("No such column"));
}

#[tokio::test]
async fn when_server_is_slow_request_times_out_without_retry() {
    // Given: A server slower than the caller's timeout
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(soda_template(rows(1)).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;
    let source = SocrataSource::new(endpoint(&server)).expect("valid endpoint");

    // When: Data is retrieved with a short timeout
    let error = source
        .retrieve(
            None,
            RetrieveOptions::default().with_timeout(Duration::from_millis(50)),
        )
        .await
        .expect_err("must time out");

    // Then: A transport error surfaces
    assert_eq!(error.kind(), SourceErrorKind::Transport);
    assert!(error.retryable());
}

#[tokio::test]
async fn when_body_is_not_json_decode_error_is_returned() {
    // Given: A successful status with an HTML body
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    let source = SocrataSource::new(endpoint(&server)).expect("valid endpoint");

    // When: Data is retrieved
    let error = source
        .retrieve(None, RetrieveOptions::default())
        .await
        .expect_err("html is not a dataset");

    // Then: Decoding fails
    assert_eq!(error.kind(), SourceErrorKind::Decode);
}

// =============================================================================
// Plain HTTP source
// =============================================================================

#[tokio::test]
async fn when_only_headers_are_needed_head_is_issued() {
    // Given: An endpoint answering HEAD
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path(RESOURCE))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Last-Modified", "Wed, 21 Oct 2015 07:28:00 GMT"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let source = HttpDataSource::new(endpoint(&server)).expect("valid endpoint");

    // When: Only headers are fetched
    let headers = source
        .head(FetchOptions::default().timeout)
        .await
        .expect("head ok");

    // Then: The header map comes back keyed in lowercase
    assert_eq!(
        headers.get("last-modified").map(String::as_str),
        Some("Wed, 21 Oct 2015 07:28:00 GMT")
    );
}
