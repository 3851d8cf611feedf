//! Configuration loader and typed retrieval settings.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `OPENAI_API_KEY`
//! + `APP_*` env vars (nested with `__`, e.g. `APP_RANKING__TOP_K=8`).
//! Every section falls back to the defaults below when absent.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
    env_name: String,
}

impl Config {
    /// Load from the working directory, picking the overlay by `RUST_ENV`.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(dir, &env_name)
    }

    pub fn load_for_env(dir: &Path, env_name: &str) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(RetrievalSettings::default()))
            .merge(Toml::file(dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment
            .merge(Env::raw().only(&["OPENAI_API_KEY"]).map(|_| "embedding.api_key".into()))
            .merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, env_name: env_name.to_string() };
        config.validate_for_env()?;
        Ok(config)
    }

    /// Wrap an already assembled figment, e.g. defaults with programmatic
    /// overrides. The same environment checks as `load_for_env` apply.
    pub fn from_figment(figment: Figment, env_name: &str) -> Result<Self> {
        let config = Self { figment, env_name: env_name.to_string() };
        config.validate_for_env()?;
        Ok(config)
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::Configuration(format!("Failed to get '{key}': {e}")))
    }

    pub fn settings(&self) -> Result<RetrievalSettings> {
        let settings: RetrievalSettings = self
            .figment
            .extract()
            .map_err(|e| Error::Configuration(format!("Failed to read settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate_for_env(&self) -> Result<()> {
        let settings = self.settings()?;
        match self.env_name.as_str() {
            "prod" | "production" => {
                if settings.embedding.provider == EmbeddingBackend::Deterministic {
                    return Err(Error::Configuration(
                        "prod config must use a real embedding provider, not 'deterministic'".into(),
                    ));
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalSettings {
    pub chunking: ChunkingSettings,
    pub ranking: RankingSettings,
    pub embedding: EmbeddingSettings,
    pub completion: CompletionSettings,
}

impl RetrievalSettings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        self.ranking.validate()?;
        if self.embedding.timeout_secs == 0 {
            return Err(Error::Configuration("embedding.timeout_secs must be > 0".into()));
        }
        if self.embedding.provider == EmbeddingBackend::Deterministic && self.embedding.dimension == 0 {
            return Err(Error::Configuration("embedding.dimension must be > 0".into()));
        }
        Ok(())
    }
}

/// Chunk sizes in characters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingSettings {
    pub max_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { max_size: 300, overlap: 100 }
    }
}

impl ChunkingSettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(Error::Configuration("chunking.max_size must be > 0".into()));
        }
        if self.max_size <= self.overlap {
            return Err(Error::Configuration(format!(
                "chunking.max_size ({}) must exceed chunking.overlap ({})",
                self.max_size, self.overlap
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RankingSettings {
    /// Minimum cosine similarity for a confident match.
    pub threshold: f32,
    pub top_k: usize,
    /// Score given to lexical candidates that match no query term.
    pub lexical_floor: f32,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self { threshold: 0.3, top_k: 5, lexical_floor: 0.1 }
    }
}

impl RankingSettings {
    pub fn validate(&self) -> Result<()> {
        if !(-1.0..=1.0).contains(&self.threshold) {
            return Err(Error::Configuration(format!(
                "ranking.threshold must be within [-1, 1], got {}",
                self.threshold
            )));
        }
        if self.top_k == 0 {
            return Err(Error::Configuration("ranking.top_k must be > 0".into()));
        }
        if !(self.lexical_floor > 0.0 && self.lexical_floor <= 1.0) {
            return Err(Error::Configuration(format!(
                "ranking.lexical_floor must be within (0, 1], got {}",
                self.lexical_floor
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// OpenAI-compatible `/embeddings` endpoint.
    OpenAi,
    /// Hashed bag-of-words vectors; no network.
    Deterministic,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingBackend,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub dimension: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::OpenAi,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            api_key: None,
            timeout_secs: 30,
            dimension: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self { model: "gpt-4o-mini".to_string(), temperature: 0.7 }
    }
}
