//! RAG client implementations.

pub mod http;

pub use http::{query_endpoint, HttpRagClient, QUERY_PATH};
