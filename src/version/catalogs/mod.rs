//! Catalog implementations for fetching plugin data

pub mod http;

pub use http::HttpCatalog;
