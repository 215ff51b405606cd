use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Which text-to-vector backend the resolver uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    Ollama,
    TokenHash,
}

impl FromStr for EmbeddingBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "ollama" => Ok(EmbeddingBackend::Ollama),
            "token-hash" | "token_hash" => Ok(EmbeddingBackend::TokenHash),
            other => bail!("Unknown EMBEDDING_BACKEND '{other}' (expected 'ollama' or 'token-hash')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub role_catalog_path: PathBuf,
    pub transition_graph_path: PathBuf,
    /// When unset, the index is built at startup by embedding the catalog.
    pub role_embeddings_path: Option<PathBuf>,
    pub embedding_backend: EmbeddingBackend,
    pub ollama_host: String,
    pub embedding_model: String,
    pub embedding_timeout_secs: u64,
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            role_catalog_path: require_env("ROLE_CATALOG_PATH")?.into(),
            transition_graph_path: require_env("TRANSITION_GRAPH_PATH")?.into(),
            role_embeddings_path: std::env::var("ROLE_EMBEDDINGS_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            embedding_backend: env_or("EMBEDDING_BACKEND", "ollama").parse()?,
            ollama_host: env_or("OLLAMA_HOST", "http://localhost:11434"),
            embedding_model: env_or("EMBEDDING_MODEL", "all-minilm"),
            embedding_timeout_secs: parse_env("EMBEDDING_TIMEOUT_SECS", "30")?,
            default_top_k: parse_env("DEFAULT_TOP_K", "3")?,
            max_top_k: parse_env("MAX_TOP_K", "50")?,
            port: parse_env("PORT", "8080")?,
            rust_log: env_or("RUST_LOG", "info"),
        };

        if config.max_top_k == 0 {
            bail!("MAX_TOP_K must be at least 1");
        }
        if config.default_top_k == 0 || config.default_top_k > config.max_top_k {
            bail!(
                "DEFAULT_TOP_K must be between 1 and MAX_TOP_K ({})",
                config.max_top_k
            );
        }

        Ok(config)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_or(key, default)
        .trim()
        .parse::<T>()
        .with_context(|| format!("{key} must be a valid number"))
}
