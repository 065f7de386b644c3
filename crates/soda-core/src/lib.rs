//! # Soda Core
//!
//! Data source contracts and a Socrata Open Data (SODA2) adapter.
//!
//! ## Overview
//!
//! This crate pulls one tabular dataset at a time from a SODA2 endpoint and
//! returns the rows together with what the response headers say about them:
//!
//! - **Capabilities** for plain and schema-aware data sources
//! - **Typed SoQL queries** serialized to `$`-prefixed query-string keys
//! - **Schema and freshness** derived from `X-SODA2-*` headers
//! - **Request diagnostics** (elapsed time, server date, request id)
//! - **Dataset catalogue** loaded from YAML
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Protocol adapters (Socrata) |
//! | [`config`] | YAML dataset catalogue |
//! | [`data_source`] | Capability traits and source errors |
//! | [`domain`] | Query, schema and timestamp types |
//! | [`error`] | Validation and config errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`http_source`] | Endpoint-bound HTTP data source |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use soda_core::{QueryParameters, RetrieveOptions, SocrataSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = SocrataSource::new("https://www.datos.gov.co/resource/yb9r-2dsi.json")?;
//!     let query = QueryParameters::builder()
//!         .order("fecha_accidente ASC")
//!         .offset("1000")
//!         .build()?;
//!
//!     let dataset = source.retrieve(Some(query), RetrieveOptions::default()).await?;
//!     println!("{} rows, last modified {}", dataset.row_count().unwrap_or(0),
//!         dataset.metadata.content_last_modified);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Caller   │
//! └────────┬────────┘
//!          │ QueryParameters
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ SocrataSource   │────▶│ ResponseMetadata │
//! │ (SODA2 adapter) │     │ (schema, dates)  │
//! └────────┬────────┘     └──────────────────┘
//!          │ $-prefixed query
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ HttpDataSource  │────▶│ HTTP Client      │
//! │ (endpoint)      │     │ (reqwest/noop)   │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Source operations return [`SourceError`] with a matchable kind:
//!
//! ```rust
//! use soda_core::{SourceError, SourceErrorKind};
//!
//! fn handle_error(error: SourceError) {
//!     match error.kind() {
//!         SourceErrorKind::Transport => {
//!             // Network failure or timeout; safe to call again
//!         }
//!         SourceErrorKind::HttpStatus => {
//!             // Rejected query; message carries the server's reason
//!         }
//!         SourceErrorKind::MissingHeader | SourceErrorKind::MalformedHeader => {
//!             // Endpoint is not a SODA2 resource
//!         }
//!         _ => {}
//!     }
//! }
//! ```

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod http_source;

// Adapter implementations
pub use adapters::{
    ResponseDetails, ResponseMetadata, RetrieveOptions, SocrataDataset, SocrataSource,
};

// Configuration
pub use config::{DatasetConfig, SourcesConfig};

// Capabilities and source errors
pub use data_source::{DataSource, SourceError, SourceErrorKind, SourceFuture, StructuredDataSource};

// Domain types
pub use domain::{HttpDate, QueryParameters, QueryParametersBuilder, Schema};

// Error types
pub use error::{ConfigError, ValidationError};

// HTTP client types
pub use http_client::{
    HeaderMap, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};

// HTTP data source
pub use http_source::{FetchOptions, Fetched, HttpDataSource};
