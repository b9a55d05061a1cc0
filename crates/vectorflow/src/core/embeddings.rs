//! Text embedding interfaces.
//!
//! An embeddings provider turns text into fixed-length numeric vectors. Every
//! provider exposes a batch operation for documents and a single-string
//! operation for queries; some models embed queries and documents differently,
//! which is why both exist.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info_span, Instrument};

use crate::core::error::Result;

/// Interface for converting text into embedding vectors.
///
/// All vectors produced by one provider instance have the same length; vector
/// stores size their schemas from that length.
#[async_trait]
pub trait Embeddings: Send + Sync {
    /// Internal method - use [`embed`] instead.
    ///
    /// Embeds a batch of document texts, one vector per input text.
    async fn _embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Internal method - use [`embed_query`] instead.
    ///
    /// Embeds a single query string.
    async fn _embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

/// Embed a batch of document texts.
///
/// Wraps the provider call in a tracing span recording the batch size.
pub async fn embed(embeddings: Arc<dyn Embeddings>, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let span = info_span!(
        "embeddings.embed_documents",
        embeddings.text_count = texts.len()
    );
    async move { embeddings._embed_documents(texts).await }
        .instrument(span)
        .await
}

/// Embed a single query string.
///
/// Wraps the provider call in a tracing span recording the query length.
pub async fn embed_query(embeddings: Arc<dyn Embeddings>, text: &str) -> Result<Vec<f32>> {
    let span = info_span!("embeddings.embed_query", embeddings.query_len = text.len());
    async move { embeddings._embed_query(text).await }
        .instrument(span)
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct FixedEmbeddings {
        dimensions: usize,
    }

    #[async_trait]
    impl Embeddings for FixedEmbeddings {
        async fn _embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.5; self.dimensions]).collect())
        }

        async fn _embed_query(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.5; self.dimensions])
        }
    }

    #[tokio::test]
    async fn test_embed_batches_all_texts() {
        let embeddings: Arc<dyn Embeddings> = Arc::new(FixedEmbeddings { dimensions: 4 });
        let texts = vec!["a".to_string(), "b".to_string()];

        let vectors = embed(embeddings, &texts).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].len(), 4);
    }

    #[tokio::test]
    async fn test_embed_query_single_vector() {
        let embeddings: Arc<dyn Embeddings> = Arc::new(FixedEmbeddings { dimensions: 8 });

        let vector = embed_query(embeddings, "query").await.unwrap();
        assert_eq!(vector.len(), 8);
    }
}
