//! Mock embeddings provider for testing.
//!
//! Generates deterministic vectors from text bytes so tests can exercise
//! embedding-driven code paths without external API keys or network calls.

use async_trait::async_trait;
use vectorflow::core::embeddings::Embeddings;
use vectorflow::core::error::Result;

/// Deterministic embeddings provider for tests.
///
/// Each component mixes the text bytes with its own index, so different texts
/// produce different vectors while the same text always produces the same
/// vector. Vectors are normalized to unit length.
#[derive(Debug, Clone, Copy)]
pub struct MockEmbeddings {
    /// Dimensionality of generated vectors (default: 3)
    pub dimensions: usize,
}

impl Default for MockEmbeddings {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmbeddings {
    /// Creates a mock embeddings provider producing 3-dimensional vectors.
    #[must_use]
    pub fn new() -> Self {
        Self { dimensions: 3 }
    }

    /// Creates a mock embeddings provider with custom dimensionality.
    #[must_use]
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn generate_vector(&self, text: &str) -> Vec<f32> {
        let bytes = text.as_bytes();

        let mut vector = Vec::with_capacity(self.dimensions);
        for i in 0..self.dimensions {
            let byte = if bytes.is_empty() {
                0
            } else {
                bytes[i % bytes.len()]
            };
            let mixed = u32::from(byte)
                .wrapping_mul(31)
                .wrapping_add(i as u32)
                .wrapping_add(bytes.len() as u32);
            vector.push((mixed % 257) as f32 / 257.0);
        }

        let magnitude: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            vector.iter().map(|v| v / magnitude).collect()
        } else {
            vec![1.0 / (self.dimensions as f32).sqrt(); self.dimensions]
        }
    }
}

#[async_trait]
impl Embeddings for MockEmbeddings {
    async fn _embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| self.generate_vector(text))
            .collect())
    }

    async fn _embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.generate_vector(text))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vectorflow::{embed, embed_query};

    #[tokio::test]
    async fn test_deterministic() {
        let embeddings: Arc<dyn Embeddings> = Arc::new(MockEmbeddings::new());

        let first = embed_query(Arc::clone(&embeddings), "Test").await.unwrap();
        let second = embed_query(embeddings, "Test").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_different_texts_differ() {
        let embeddings: Arc<dyn Embeddings> = Arc::new(MockEmbeddings::new());

        let texts = vec!["alpha".to_string(), "omega".to_string()];
        let vectors = embed(embeddings, &texts).await.unwrap();
        assert_ne!(vectors[0], vectors[1]);
    }

    #[tokio::test]
    async fn test_custom_dimensions_and_normalization() {
        let embeddings: Arc<dyn Embeddings> = Arc::new(MockEmbeddings::with_dimensions(128));

        let vector = embed_query(embeddings, "hello").await.unwrap();
        assert_eq!(vector.len(), 128);

        let magnitude: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_empty_text_is_normalized() {
        let embeddings: Arc<dyn Embeddings> = Arc::new(MockEmbeddings::new());

        let vector = embed_query(embeddings, "").await.unwrap();
        assert_eq!(vector.len(), 3);

        let magnitude: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.001);
    }
}
