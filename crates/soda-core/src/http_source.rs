//! HTTP-bound data source.
//!
//! [`HttpDataSource`] ties one endpoint URL to a transport and issues GET or
//! HEAD requests against it. It does not look at status codes; protocol
//! adapters such as [`SocrataSource`](crate::SocrataSource) decide what a
//! status means.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::data_source::{DataSource, SourceError, SourceFuture};
use crate::http_client::{
    HeaderMap, HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient, DEFAULT_TIMEOUT_MS,
};
use crate::ValidationError;

/// Transport knobs for a single fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub stream: bool,
    pub head_only: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            stream: false,
            head_only: false,
        }
    }
}

impl FetchOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn head_only(mut self) -> Self {
        self.head_only = true;
        self
    }
}

/// Result of [`HttpDataSource::fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// Full GET response.
    Response(HttpResponse),
    /// Headers of a HEAD request.
    Headers(HeaderMap),
}

/// Data source bound to one endpoint URL.
#[derive(Clone)]
pub struct HttpDataSource {
    endpoint: String,
    http_client: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for HttpDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDataSource")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl HttpDataSource {
    /// Binds `endpoint` to the default reqwest transport.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_http_client(endpoint, Arc::new(ReqwestHttpClient::default()))
    }

    pub fn with_http_client(
        endpoint: impl Into<String>,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self, ValidationError> {
        let endpoint = endpoint.into();
        validate_endpoint(&endpoint)?;
        Ok(Self {
            endpoint,
            http_client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issues one request against the endpoint.
    ///
    /// With `head_only` the query and stream flag are ignored and only the
    /// response headers come back.
    ///
    /// # Errors
    ///
    /// Returns a transport error on network failure or timeout. Status codes
    /// are not inspected.
    pub async fn fetch(
        &self,
        query: Vec<(String, String)>,
        options: FetchOptions,
    ) -> Result<Fetched, SourceError> {
        let timeout_ms = u64::try_from(options.timeout.as_millis()).unwrap_or(u64::MAX);

        let request = if options.head_only {
            HttpRequest::head(&self.endpoint).with_timeout_ms(timeout_ms)
        } else {
            HttpRequest::get(&self.endpoint)
                .with_query(query)
                .with_timeout_ms(timeout_ms)
                .with_stream(options.stream)
        };

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| SourceError::transport(format!("{} ({})", e.message(), self.endpoint)))?;

        debug!(endpoint = %self.endpoint, status = response.status, "fetch completed");

        if options.head_only {
            Ok(Fetched::Headers(response.headers))
        } else {
            Ok(Fetched::Response(response))
        }
    }

    /// HEAD request returning only the headers.
    pub async fn head(&self, timeout: Duration) -> Result<HeaderMap, SourceError> {
        match self
            .fetch(Vec::new(), FetchOptions::default().with_timeout(timeout).head_only())
            .await?
        {
            Fetched::Headers(headers) => Ok(headers),
            Fetched::Response(response) => Ok(response.headers),
        }
    }

    /// GETs the endpoint and decodes the body as JSON.
    ///
    /// `head_only` in `options` is ignored; a payload needs a body.
    ///
    /// # Errors
    ///
    /// Transport errors as for [`fetch`](Self::fetch), plus a decode error
    /// when the body is not valid JSON.
    pub async fn retrieve_data(
        &self,
        query: Vec<(String, String)>,
        options: FetchOptions,
    ) -> Result<(HttpResponse, serde_json::Value), SourceError> {
        let response = self.fetch_response(query, options).await?;
        let payload = self.decode_payload(&response)?;
        Ok((response, payload))
    }

    /// GET half of [`retrieve_data`](Self::retrieve_data), for adapters that
    /// need to look at the response before decoding it.
    pub async fn fetch_response(
        &self,
        query: Vec<(String, String)>,
        options: FetchOptions,
    ) -> Result<HttpResponse, SourceError> {
        let options = FetchOptions {
            head_only: false,
            ..options
        };

        match self.fetch(query, options).await? {
            Fetched::Response(response) => Ok(response),
            Fetched::Headers(_) => Err(SourceError::decode("HEAD response carries no body")),
        }
    }

    /// Decode half of [`retrieve_data`](Self::retrieve_data).
    pub fn decode_payload(&self, response: &HttpResponse) -> Result<serde_json::Value, SourceError> {
        response.json().map_err(|e| {
            SourceError::decode(format!(
                "response body from {} is not valid JSON: {e}",
                self.endpoint
            ))
        })
    }
}

impl DataSource for HttpDataSource {
    type Request = Vec<(String, String)>;

    fn retrieve_data<'a>(&'a self, request: Self::Request) -> SourceFuture<'a, serde_json::Value> {
        Box::pin(async move {
            let (_, payload) = HttpDataSource::retrieve_data(self, request, FetchOptions::default()).await?;
            Ok(payload)
        })
    }
}

/// Checks that `endpoint` is an absolute http(s) URL with a host.
pub fn validate_endpoint(endpoint: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEndpoint {
        value: endpoint.to_owned(),
    };
    let url = reqwest::Url::parse(endpoint).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(()),
        _ => Err(invalid()),
    }
}
