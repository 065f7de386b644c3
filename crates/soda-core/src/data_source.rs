//! Data source capabilities and the structured source error.
//!
//! This module defines the two adapter contracts every source builds on:
//!
//! | Trait | Capability set |
//! |-------|----------------|
//! | [`DataSource`] | `retrieve_data` |
//! | [`StructuredDataSource`] | `retrieve_data`, `schema` |
//!
//! Neither trait assumes anything about transport or payload format beyond
//! "the fetched data decodes to JSON".
//!
//! # Example
//!
//! ```rust,ignore
//! use soda_core::{DataSource, QueryParameters, SocrataSource, StructuredDataSource};
//!
//! async fn first_rows(source: &SocrataSource) -> Result<(), soda_core::SourceError> {
//!     let query = QueryParameters::builder().order("id ASC").limit("10").build()?;
//!     let rows = source.retrieve_data(Some(query)).await?;
//!     println!("{} columns", source.schema()?.len());
//!     println!("{rows}");
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::domain::Schema;
use crate::error::ValidationError;

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    InvalidRequest,
    Transport,
    Decode,
    HttpStatus,
    MissingHeader,
    MalformedHeader,
    SchemaMismatch,
    NotRetrieved,
    DetailsUnavailable,
}

/// Structured error returned by every data source operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message, false)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Transport, message, true)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Decode, message, false)
    }

    pub fn http_status(status: u16, detail: Option<&str>) -> Self {
        let message = match detail {
            Some(detail) => format!("server returned status {status}: {detail}"),
            None => format!("server returned status {status}"),
        };
        Self::new(SourceErrorKind::HttpStatus, message, false)
    }

    pub fn missing_header(name: &str) -> Self {
        Self::new(
            SourceErrorKind::MissingHeader,
            format!("response is missing required header '{name}'"),
            false,
        )
    }

    pub fn malformed_header(name: &str, reason: impl Display) -> Self {
        Self::new(
            SourceErrorKind::MalformedHeader,
            format!("header '{name}' is malformed: {reason}"),
            false,
        )
    }

    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::SchemaMismatch, message, false)
    }

    pub fn not_retrieved(accessor: &str) -> Self {
        Self::new(
            SourceErrorKind::NotRetrieved,
            format!("'{accessor}' is unavailable until data has been retrieved"),
            false,
        )
    }

    pub fn details_unavailable(accessor: &str) -> Self {
        Self::new(
            SourceErrorKind::DetailsUnavailable,
            format!("'{accessor}' was not captured; retrieve with response details enabled"),
            false,
        )
    }

    fn new(kind: SourceErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether repeating the same call could succeed. Nothing in this crate
    /// retries on its own.
    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::Decode => "source.decode",
            SourceErrorKind::HttpStatus => "source.http_status",
            SourceErrorKind::MissingHeader => "source.missing_header",
            SourceErrorKind::MalformedHeader => "source.malformed_header",
            SourceErrorKind::SchemaMismatch => "source.schema_mismatch",
            SourceErrorKind::NotRetrieved => "source.not_retrieved",
            SourceErrorKind::DetailsUnavailable => "source.details_unavailable",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

/// Boxed future returned by source operations.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Base capability: fetch a dataset.
///
/// The request shape is left to the implementation; the payload is whatever
/// the upstream body decodes to.
pub trait DataSource: Send + Sync {
    /// Per-call request description.
    type Request: Send;

    /// Fetches and decodes the data described by `request`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the transport fails, the body does not
    /// decode, or the implementation rejects the response.
    fn retrieve_data<'a>(&'a self, request: Self::Request) -> SourceFuture<'a, serde_json::Value>;
}

/// Data source that also knows the shape of what it returned.
pub trait StructuredDataSource: DataSource {
    /// Field name to declared type, as derived by the last successful
    /// retrieval.
    ///
    /// # Errors
    ///
    /// Returns [`SourceErrorKind::NotRetrieved`] before any data has been
    /// retrieved.
    fn schema(&self) -> Result<Schema, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_errors_are_retryable() {
        assert!(SourceError::transport("timed out").retryable());
        assert!(!SourceError::decode("bad json").retryable());
        assert!(!SourceError::missing_header("Date").retryable());
    }

    #[test]
    fn display_includes_stable_code() {
        let error = SourceError::missing_header("X-SODA2-Fields");
        assert_eq!(
            error.to_string(),
            "response is missing required header 'X-SODA2-Fields' (source.missing_header)"
        );
    }

    #[test]
    fn validation_errors_become_invalid_requests() {
        let error = SourceError::from(ValidationError::EmptyQueryValue { field: "order" });
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
        assert!(error.message().contains("order"));
    }
}
