use crate::collaborators::EmbeddingService;
use crate::error::RuntimeResult;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DEFAULT_DIMENSIONS: usize = 32;

/// Deterministic synthetic embedder.
///
/// The text's blake3 digest seeds a `StdRng`, so equal texts always map to
/// the same unit vector. Stands in for a real embedding service in tests and
/// simulations; carries no semantic meaning.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let digest = blake3::hash(text.as_bytes());
        let mut rng = StdRng::from_seed(*digest.as_bytes());

        let raw: Vec<f32> = (0..self.dimensions)
            .map(|_| rng.gen_range(-1.0f32..=1.0))
            .collect();
        let norm = raw.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            return raw;
        }
        raw.into_iter().map(|v| v / norm).collect()
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

#[async_trait]
impl EmbeddingService for HashEmbedder {
    async fn embed(&self, text: &str) -> RuntimeResult<Vec<f32>> {
        Ok(self.embed_sync(text))
    }
}
