//! Local trigram-hash embedding provider.
//!
//! Produces deterministic, content-dependent vectors from character
//! trigrams and whole-word hashes. Not semantically accurate like a
//! neural model, but fully offline, which makes embedding failures a
//! non-issue: ingestion cannot be derailed by a flaky network.

use crate::embeddings::provider::EmbeddingProvider;
use crate::query::tokenize;
use sattva_core::AppResult;

/// Offline trigram-hash embedding provider.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    /// Create a provider with the given vector dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn bucket(&self, seed: u64, text: &str) -> usize {
        let hash = text
            .bytes()
            .fold(seed, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        (hash as usize) % self.dimensions
    }

    fn build_vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];

        for token in tokenize(text) {
            // Whole-word signal
            vector[self.bucket(7, &token)] += 1.0;

            // Character trigram signal, weighted down so long words do
            // not dominate the vector
            let chars: Vec<char> = token.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                vector[self.bucket(37, &trigram)] += 0.5;
            }
        }

        // Normalize to a unit vector so similarity is a dot product
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        Ok(self.build_vector(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dimensions_and_normalization() {
        let provider = TrigramProvider::new(384);
        let embedding = provider.embed("breathing exercises calm the mind").await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let provider = TrigramProvider::new(128);
        let first = provider.embed("gentle evening stretch").await.unwrap();
        let second = provider.embed("gentle evening stretch").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_different_texts_differ() {
        let provider = TrigramProvider::new(128);
        let first = provider.embed("breathing exercises").await.unwrap();
        let second = provider.embed("balance postures").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = TrigramProvider::new(64);
        let embedding = provider.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_related_texts_score_higher() {
        let provider = TrigramProvider::new(384);
        let anchor = provider.embed("breathing and stress relief").await.unwrap();
        let related = provider.embed("breathing calms stress").await.unwrap();
        let unrelated = provider.embed("wrist alignment in arm balances").await.unwrap();

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&anchor, &related) > dot(&anchor, &unrelated));
    }
}
