//! # Domain Types
//!
//! Values exchanged between callers and data sources.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`QueryParameters`] | One SoQL query (select, where, order, group, having, limit, offset) |
//! | [`Schema`] | Ordered field name to declared type mapping |
//! | [`HttpDate`] | RFC 1123 header timestamp, always UTC |
//!
//! Query values are validated when built and never coerced:
//!
//! ```rust,ignore
//! use soda_core::QueryParameters;
//!
//! let query = QueryParameters::builder()
//!     .filter("fecha_accidente <= '2024-05-01T00:00:00.000'")
//!     .order("fecha_accidente ASC")
//!     .offset("1000")
//!     .build()?;
//! assert_eq!(query.wire_keys(), vec!["$select", "$where", "$order", "$offset"]);
//! ```

mod query;
mod schema;
mod timestamp;

pub use query::{QueryParameters, QueryParametersBuilder};
pub use schema::Schema;
pub use timestamp::HttpDate;
