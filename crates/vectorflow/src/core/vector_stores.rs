//! Vector stores for storing and searching embedded data.
//!
//! Vector stores persist embedded documents and perform similarity search to
//! find the vectors closest to a query. Ranking is delegated to the backing
//! database: implementations build a backend-native top-k distance query
//! rather than sorting candidates client-side.

use crate::core::{
    documents::Document,
    embeddings::Embeddings,
    error::{Error, Result},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Distance metric used by a backend to rank stored vectors against a query.
///
/// Different metrics fit different embedding models:
/// - **Cosine**: best for normalized embeddings
/// - **Euclidean**: good for unnormalized embeddings
/// - **`DotProduct`** / **`MaxInnerProduct`**: fast for normalized embeddings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Cosine distance: angle between vectors (0 = identical)
    Cosine,

    /// Euclidean distance: L2 norm (0 = identical)
    Euclidean,

    /// Dot product: inner product of vectors, higher is more similar
    DotProduct,

    /// Maximum inner product: asymmetric similarity
    MaxInnerProduct,
}

/// Core vector store trait for storing and searching embeddings.
///
/// # Required Methods
///
/// Implementations must provide:
/// - `add_texts`: embed and store texts
/// - `_similarity_search`: find the k most similar documents
///
/// # Optional Methods
///
/// Default implementations are provided for `add_documents` (delegates to
/// `add_texts`), the scored/by-vector search variants, `delete` and
/// `get_by_ids`; stores override the ones their backend supports.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Get the embeddings instance used by this vector store.
    ///
    /// Returns None if the vector store doesn't expose its embeddings.
    fn embeddings(&self) -> Option<Arc<dyn Embeddings>> {
        None
    }

    /// Get the distance metric used by this vector store.
    fn distance_metric(&self) -> DistanceMetric {
        DistanceMetric::Cosine
    }

    /// Add texts to the vector store.
    ///
    /// # Arguments
    ///
    /// * `texts` - Texts to embed and add to the store
    /// * `metadatas` - Optional metadata for each text (must match length of texts)
    /// * `ids` - Optional IDs for each text (if None, UUIDs will be generated)
    ///
    /// # Returns
    ///
    /// List of IDs for the added texts
    ///
    /// # Errors
    ///
    /// Returns an error if the metadatas or ids length doesn't match the texts
    /// length, if embedding fails, or if the storage operation fails.
    async fn add_texts(
        &mut self,
        texts: &[impl AsRef<str> + Send + Sync],
        metadatas: Option<&[HashMap<String, serde_json::Value>]>,
        ids: Option<&[String]>,
    ) -> Result<Vec<String>>;

    /// Add documents to the vector store.
    ///
    /// Each document's `page_content` is embedded; `ids` overrides
    /// `document.id` when present.
    async fn add_documents(
        &mut self,
        documents: &[Document],
        ids: Option<&[String]>,
    ) -> Result<Vec<String>> {
        let texts: Vec<&str> = documents
            .iter()
            .map(|doc| doc.page_content.as_str())
            .collect();

        let metadatas: Vec<HashMap<String, serde_json::Value>> =
            documents.iter().map(|doc| doc.metadata.clone()).collect();

        let generated_ids: Vec<String>;
        let ids_ref = if let Some(ids) = ids {
            ids
        } else {
            // Use document IDs if available, otherwise generate UUIDs
            generated_ids = documents
                .iter()
                .map(|doc| {
                    doc.id
                        .clone()
                        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
                })
                .collect();
            &generated_ids
        };

        self.add_texts(&texts, Some(&metadatas), Some(ids_ref))
            .await
    }

    /// Delete documents by ID (if None, delete all).
    async fn delete(&mut self, _ids: Option<&[String]>) -> Result<bool> {
        Err(Error::NotImplemented(
            "delete not implemented for this vector store".to_string(),
        ))
    }

    /// Get documents by their IDs.
    ///
    /// Missing IDs are skipped rather than raising an error; the order of the
    /// returned documents may not match the order of the input IDs.
    async fn get_by_ids(&self, _ids: &[String]) -> Result<Vec<Document>> {
        Err(Error::NotImplemented(
            "get_by_ids not implemented for this vector store".to_string(),
        ))
    }

    /// Find the k documents most similar to the query text.
    ///
    /// # Arguments
    ///
    /// * `query` - Query text to search for
    /// * `k` - Number of results to return
    /// * `filter` - Optional metadata filter (field -> value)
    #[doc(hidden)]
    async fn _similarity_search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<Vec<Document>>;

    /// Perform similarity search with distance scores.
    ///
    /// Returns `(document, distance)` pairs in the backend's ranking order.
    async fn similarity_search_with_score(
        &self,
        _query: &str,
        _k: usize,
        _filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<Vec<(Document, f32)>> {
        Err(Error::NotImplemented(
            "similarity_search_with_score not implemented for this vector store".to_string(),
        ))
    }

    /// Perform similarity search by vector.
    async fn similarity_search_by_vector(
        &self,
        _embedding: &[f32],
        _k: usize,
        _filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<Vec<Document>> {
        Err(Error::NotImplemented(
            "similarity_search_by_vector not implemented for this vector store".to_string(),
        ))
    }

    /// Perform similarity search by vector with distance scores.
    async fn similarity_search_by_vector_with_score(
        &self,
        _embedding: &[f32],
        _k: usize,
        _filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<Vec<(Document, f32)>> {
        Err(Error::NotImplemented(
            "similarity_search_by_vector_with_score not implemented for this vector store"
                .to_string(),
        ))
    }
}
