use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use docrag_core::error::ProviderError;
use docrag_core::traits::Embedder;
use docrag_core::types::Vector;
use twox_hash::XxHash64;

/// Hashed bag-of-words vectors: no network, same text in, same vector out.
///
/// Tokens are lowercased and stripped of surrounding punctuation, so texts
/// sharing words point in similar directions. Output is L2-normalized; text
/// without tokens maps to the zero vector.
pub struct DeterministicEmbedder {
    dim: usize,
    id: String,
}

impl DeterministicEmbedder {
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self { dim, id: format!("deterministic:d{dim}") }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn embed_text(&self, text: &str) -> Vector {
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            if token.is_empty() {
                continue;
            }
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            v[idx] += 0.5 + ((h >> 32) as u32) as f32 / u32::MAX as f32;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

#[async_trait]
impl Embedder for DeterministicEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>, ProviderError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
