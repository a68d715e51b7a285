//! Embedding provider port — opaque remote (or local) embedding collaborator.

use crate::error::Result;
use async_trait::async_trait;

/// Embedding provider collaborator contract (spec.md §1, "explicitly out of scope").
#[async_trait]
pub trait EmbedderPort: Send + Sync {
    /// Embed a batch of texts, returning one dense vector per input in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// The provider name recorded in an [`crate::value_objects::IndexFingerprint`].
    fn provider_name(&self) -> &str;

    /// The model name recorded in an [`crate::value_objects::IndexFingerprint`].
    fn model_name(&self) -> &str;

    /// The output vector dimension.
    fn dimension(&self) -> usize;
}
