use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::data_source::{DataSource, SourceError, SourceFuture, StructuredDataSource};
use crate::http_client::{HeaderMap, HttpClient, HttpResponse, DEFAULT_TIMEOUT_MS};
use crate::http_source::{FetchOptions, HttpDataSource};
use crate::{HttpDate, QueryParameters, Schema, ValidationError};

pub const FIELDS_HEADER: &str = "X-SODA2-Fields";
pub const TYPES_HEADER: &str = "X-SODA2-Types";
pub const TRUTH_LAST_MODIFIED_HEADER: &str = "X-SODA2-Truth-Last-Modified";
pub const DATE_HEADER: &str = "Date";
pub const REQUEST_ID_HEADER: &str = "X-Socrata-RequestId";

/// Per-call options for [`SocrataSource::retrieve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrieveOptions {
    /// Capture elapsed time, the server `Date` and the request id.
    pub get_response_details: bool,
    pub timeout: Duration,
    pub stream: bool,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            get_response_details: true,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            stream: false,
        }
    }
}

impl RetrieveOptions {
    pub fn without_details(mut self) -> Self {
        self.get_response_details = false;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// Request diagnostics captured when response details are requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseDetails {
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub request_date: HttpDate,
    pub request_id: String,
}

/// Everything extracted from one successful SODA2 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseMetadata {
    pub status: u16,
    pub schema: Schema,
    pub content_last_modified: HttpDate,
    pub encoding: Option<String>,
    #[serde(skip)]
    pub headers: HeaderMap,
    pub details: Option<ResponseDetails>,
}

impl ResponseMetadata {
    /// Builds the snapshot from response headers.
    ///
    /// Schema and freshness are always required. The three diagnostics are
    /// required only when `with_details` is set.
    pub fn from_response(response: &HttpResponse, with_details: bool) -> Result<Self, SourceError> {
        let schema = parse_schema(response)?;
        debug!(fields = schema.len(), "derived schema from SODA2 headers");

        let content_last_modified = parse_date_header(response, TRUTH_LAST_MODIFIED_HEADER)?;

        let details = if with_details {
            Some(ResponseDetails {
                elapsed: response.elapsed,
                request_date: parse_date_header(response, DATE_HEADER)?,
                request_id: required_header(response, REQUEST_ID_HEADER)?.to_owned(),
            })
        } else {
            None
        };

        Ok(Self {
            status: response.status,
            schema,
            content_last_modified,
            encoding: response.encoding.clone(),
            headers: response.headers.clone(),
            details,
        })
    }
}

/// Rows plus the metadata of the response that carried them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocrataDataset {
    pub rows: serde_json::Value,
    pub metadata: ResponseMetadata,
}

impl SocrataDataset {
    /// Number of rows when the payload is a JSON array.
    pub fn row_count(&self) -> Option<usize> {
        self.rows.as_array().map(Vec::len)
    }
}

/// SODA2 adapter over an [`HttpDataSource`].
///
/// Each successful [`retrieve`](Self::retrieve) replaces the snapshot read by
/// the accessors. A failed call leaves the previous snapshot untouched.
/// Calls on one instance are expected to be sequential; concurrent callers
/// race on the snapshot and the last writer wins.
#[derive(Debug)]
pub struct SocrataSource {
    http: HttpDataSource,
    current: Mutex<Option<ResponseMetadata>>,
}

impl SocrataSource {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self::from_http_source(HttpDataSource::new(endpoint)?))
    }

    pub fn with_http_client(
        endpoint: impl Into<String>,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::from_http_source(HttpDataSource::with_http_client(
            endpoint,
            http_client,
        )?))
    }

    pub fn from_http_source(http: HttpDataSource) -> Self {
        Self {
            http,
            current: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.http.endpoint()
    }

    /// Runs one SoQL query and captures the response metadata.
    ///
    /// `None` selects every column with no filter, ordering or paging.
    /// Socrata rejects HEAD, so this always issues a GET.
    ///
    /// # Errors
    ///
    /// - transport failure or timeout
    /// - non-2xx status
    /// - body that is not JSON
    /// - missing or malformed SODA2 headers
    /// - mismatched field and type lists
    pub async fn retrieve(
        &self,
        query: Option<QueryParameters>,
        options: RetrieveOptions,
    ) -> Result<SocrataDataset, SourceError> {
        let query = query.unwrap_or_default();
        let fetch_options = FetchOptions::default()
            .with_timeout(options.timeout)
            .with_stream(options.stream);

        let response = self
            .http
            .fetch_response(query.to_wire(), fetch_options)
            .await?;

        if !response.is_success() {
            let detail = error_message(&response);
            warn!(
                endpoint = %self.endpoint(),
                status = response.status,
                detail = detail.as_deref().unwrap_or(""),
                "SODA2 request was rejected"
            );
            return Err(SourceError::http_status(response.status, detail.as_deref()));
        }

        let rows = self.http.decode_payload(&response)?;
        let metadata = ResponseMetadata::from_response(&response, options.get_response_details)?;

        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(metadata.clone());

        Ok(SocrataDataset { rows, metadata })
    }

    /// Snapshot from the last successful retrieval.
    pub fn last_metadata(&self) -> Option<ResponseMetadata> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn schema(&self) -> Result<Schema, SourceError> {
        self.read("schema", |meta| Ok(meta.schema.clone()))
    }

    pub fn content_last_modified(&self) -> Result<HttpDate, SourceError> {
        self.read("content_last_modified", |meta| Ok(meta.content_last_modified))
    }

    pub fn encoding(&self) -> Result<Option<String>, SourceError> {
        self.read("encoding", |meta| Ok(meta.encoding.clone()))
    }

    pub fn elapsed_time(&self) -> Result<Duration, SourceError> {
        self.read_details("elapsed_time", |details| details.elapsed)
    }

    pub fn request_date(&self) -> Result<HttpDate, SourceError> {
        self.read_details("request_date", |details| details.request_date)
    }

    pub fn request_id(&self) -> Result<String, SourceError> {
        self.read_details("request_id", |details| details.request_id.clone())
    }

    fn read<T>(
        &self,
        accessor: &str,
        f: impl FnOnce(&ResponseMetadata) -> Result<T, SourceError>,
    ) -> Result<T, SourceError> {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        match current.as_ref() {
            Some(meta) => f(meta),
            None => Err(SourceError::not_retrieved(accessor)),
        }
    }

    fn read_details<T>(
        &self,
        accessor: &str,
        f: impl FnOnce(&ResponseDetails) -> T,
    ) -> Result<T, SourceError> {
        self.read(accessor, |meta| {
            meta.details
                .as_ref()
                .map(f)
                .ok_or_else(|| SourceError::details_unavailable(accessor))
        })
    }
}

impl DataSource for SocrataSource {
    type Request = Option<QueryParameters>;

    fn retrieve_data<'a>(&'a self, request: Self::Request) -> SourceFuture<'a, serde_json::Value> {
        Box::pin(async move {
            let dataset = self.retrieve(request, RetrieveOptions::default()).await?;
            Ok(dataset.rows)
        })
    }
}

impl StructuredDataSource for SocrataSource {
    fn schema(&self) -> Result<Schema, SourceError> {
        SocrataSource::schema(self)
    }
}

fn required_header<'a>(response: &'a HttpResponse, name: &str) -> Result<&'a str, SourceError> {
    response
        .header(name)
        .ok_or_else(|| SourceError::missing_header(name))
}

fn parse_schema(response: &HttpResponse) -> Result<Schema, SourceError> {
    let fields = parse_string_array(response, FIELDS_HEADER)?;
    let types = parse_string_array(response, TYPES_HEADER)?;
    Schema::from_columns(fields, types)
}

fn parse_string_array(response: &HttpResponse, name: &str) -> Result<Vec<String>, SourceError> {
    let raw = required_header(response, name)?;
    serde_json::from_str(raw).map_err(|e| SourceError::malformed_header(name, e))
}

fn parse_date_header(response: &HttpResponse, name: &str) -> Result<HttpDate, SourceError> {
    let raw = required_header(response, name)?;
    HttpDate::parse(raw).map_err(|e| SourceError::malformed_header(name, e))
}

/// Socrata error bodies look like `{"code": ..., "error": true, "message": ...}`.
fn error_message(response: &HttpResponse) -> Option<String> {
    let body: serde_json::Value = serde_json::from_str(&response.body).ok()?;
    body.get("message")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
}

fn serialize_millis<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}
