//! Text-to-vector backends for role resolution.
//!
//! `RoleResolver` holds an `Arc<dyn Embedder>`; the backend is chosen at
//! startup from `EMBEDDING_BACKEND`. Backends need not return unit vectors,
//! the resolver normalizes every query itself.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const MAX_RETRIES: u32 = 3;

/// Dimension of `TokenHashEmbedder` vectors unless overridden.
pub const TOKEN_HASH_DIM: usize = 128;

#[derive(Debug, Error)]
pub enum EmbedderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("embedding backend returned no vectors")]
    EmptyContent,

    #[error("embedding backend returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
}

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Short backend label for logs, e.g. `ollama:all-minilm`.
    fn name(&self) -> String;

    /// Embeds every text, preserving input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedderError>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or(EmbedderError::EmptyContent)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OllamaEmbedder
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    truncate: bool,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorBody {
    error: String,
}

/// Embeds text through an Ollama server's batched `/api/embed` endpoint.
/// Retries transport failures, 429 and 5xx with exponential backoff.
#[derive(Clone)]
pub struct OllamaEmbedder {
    client: Client,
    url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(host: &str, model: &str, timeout: Duration) -> Result<Self, EmbedderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}/api/embed", normalize_host(host)),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn name(&self) -> String {
        format!("ollama:{}", self.model)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request_body = EmbedRequest {
            model: &self.model,
            input: texts,
            truncate: true,
        };

        let mut last_error: Option<EmbedderError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Embedding attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&self.url).json(&request_body).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbedderError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Embedding server returned {}: {}", status, body);
                last_error = Some(EmbedderError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<OllamaErrorBody>(&body)
                    .map(|e| e.error)
                    .unwrap_or(body);
                return Err(EmbedderError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let parsed: EmbedResponse = serde_json::from_str(&body)?;
            if parsed.embeddings.len() != texts.len() {
                return Err(EmbedderError::CountMismatch {
                    expected: texts.len(),
                    got: parsed.embeddings.len(),
                });
            }

            debug!("Embedded {} texts via {}", texts.len(), self.url);
            return Ok(parsed.embeddings);
        }

        Err(last_error.unwrap_or(EmbedderError::EmptyContent))
    }
}

/// Accepts `localhost:11434`, `http://host:11434/` and similar forms.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TokenHashEmbedder
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic offline embedder: each lowercase alphanumeric token is hashed
/// with FNV-1a into one signed bucket of a fixed-size vector.
///
/// Texts sharing tokens land close together; no model or network is needed.
#[derive(Debug, Clone)]
pub struct TokenHashEmbedder {
    dimension: usize,
}

impl TokenHashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0_f32; self.dimension];
        for token in tokenize(text) {
            let h = fnv1a64(&token);
            let idx = (h % self.dimension as u64) as usize;
            let sign = if (h >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }
        v
    }
}

impl Default for TokenHashEmbedder {
    fn default() -> Self {
        Self::new(TOKEN_HASH_DIM)
    }
}

#[async_trait]
impl Embedder for TokenHashEmbedder {
    fn name(&self) -> String {
        format!("token-hash:{}", self.dimension)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn fnv1a64(s: &str) -> u64 {
    let mut h: u64 = 14695981039346656037;
    for b in s.as_bytes() {
        h ^= *b as u64;
        h = h.wrapping_mul(1099511628211);
    }
    h
}
