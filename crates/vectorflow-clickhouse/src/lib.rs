//! ClickHouse vector store integration for `VectorFlow`.
//!
//! This crate stores embedded documents in a ClickHouse (or MyScale) table and
//! delegates similarity search to the database: queries are expressed as an
//! ORDER-BY-distance SQL statement with a LIMIT, so no ranking happens client
//! side. The table is created lazily with a vector column sized to the
//! embedding dimensionality and an approximate-nearest-neighbor index.
//!
//! # Prerequisites
//!
//! A ClickHouse server reachable over its HTTP interface. The easiest way is
//! with Docker:
//!
//! ```bash
//! docker run --name clickhouse -p 8123:8123 -d clickhouse/clickhouse-server
//! ```
//!
//! # Examples
//!
//! ```ignore
//! use std::sync::Arc;
//! use vectorflow::core::embeddings::Embeddings;
//! use vectorflow_clickhouse::{ClickHouseSettings, ClickHouseVectorStore, Metadatas};
//!
//! # async fn example(embeddings: Arc<dyn Embeddings>) -> Result<(), Box<dyn std::error::Error>> {
//! let store = ClickHouseVectorStore::from_texts(
//!     &["Hello world", "Bye bye"],
//!     Metadatas::default(),
//!     embeddings,
//!     ClickHouseSettings {
//!         host: "localhost".into(),
//!         port: 8123,
//!         protocol: "http://".into(),
//!         ..ClickHouseSettings::default()
//!     },
//! )
//! .await?;
//!
//! let results = store.similarity_search("hello", 2, None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`vectorflow::core::vector_stores::VectorStore`] - The trait this implements
//! - [`vectorflow::core::embeddings::Embeddings`] - Required for generating vectors

mod clickhouse_store;
mod client;

pub use clickhouse_store::{
    ClickHouseColumnMap, ClickHouseFilter, ClickHouseSettings, ClickHouseVectorStore, Metadatas,
};
