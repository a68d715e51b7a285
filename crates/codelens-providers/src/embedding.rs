//! Deterministic hash-based `EmbedderPort` adapter. Produces stable,
//! content-derived vectors without a model or network call, grounded on the
//! teacher's `InMemoryVectorStoreProvider` default-adapter idiom: a
//! dependency-free stand-in so the workspace builds and tests without a real
//! embedding provider configured.

use async_trait::async_trait;
use codelens_domain::error::Result;
use codelens_domain::ports::EmbedderPort;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Embeds text by hashing overlapping shingles into a fixed-size vector.
/// Two texts that share more substrings land closer together under cosine
/// similarity than two unrelated texts — enough signal for tests and local
/// development, not a substitute for a real model.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Build an embedder producing vectors of `dimension` floats.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

fn embed_one(text: &str, dimension: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dimension];
    const SHINGLE_LEN: usize = 3;
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return vector;
    }

    for window in words.windows(SHINGLE_LEN.min(words.len())) {
        let shingle = window.join(" ");
        let mut hasher = DefaultHasher::new();
        shingle.to_lowercase().hash(&mut hasher);
        let bucket = (hasher.finish() as usize) % dimension;
        vector[bucket] += 1.0;
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut vector {
            *v /= norm;
        }
    }
    vector
}

#[async_trait]
impl EmbedderPort for HashEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| embed_one(t, self.dimension)).collect())
    }

    fn provider_name(&self) -> &str {
        "hash"
    }

    fn model_name(&self) -> &str {
        "shingle-hash-v1"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn vectors_have_the_configured_dimension() {
        let embedder = HashEmbedder::new(64);
        let vectors = embedder.embed(&["hello world".to_string()]).await.unwrap();
        assert_eq!(vectors[0].len(), 64);
    }

    #[tokio::test]
    async fn identical_text_embeds_identically() {
        let embedder = HashEmbedder::default();
        let vectors = embedder.embed(&["fn parse_config() -> Config".to_string(), "fn parse_config() -> Config".to_string()]).await.unwrap();
        assert_eq!(vectors[0], vectors[1]);
    }

    #[tokio::test]
    async fn empty_text_embeds_to_zero_vector() {
        let embedder = HashEmbedder::new(16);
        let vectors = embedder.embed(&[String::new()]).await.unwrap();
        assert!(vectors[0].iter().all(|v| *v == 0.0));
    }
}
