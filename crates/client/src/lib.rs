//! Client crate for the intelligent RAG server.
//!
//! Provides the `/api/query` wire types, the `RagClient` trait the pipe
//! depends on, and a reqwest-backed implementation.
//!
//! # Example
//! ```no_run
//! use ragpipe_client::{HttpRagClient, QueryRequest, RagClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpRagClient::new("http://localhost:3000")?;
//! let request = QueryRequest::new("default", "How do I rotate keys?", 2);
//! let response = client.query(&request).await?;
//! println!("{}", response.answer);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{QueryRequest, QueryResponse, RagClient};
pub use factory::create_client;
pub use providers::HttpRagClient;
