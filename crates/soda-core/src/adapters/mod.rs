//! Protocol adapters built on [`HttpDataSource`](crate::HttpDataSource).

pub mod socrata;

pub use socrata::{
    ResponseDetails, ResponseMetadata, RetrieveOptions, SocrataDataset, SocrataSource,
};
