//! Reqwest-backed Gemini itinerary generator.
//!
//! Owns transport details only: request serialisation, key rotation, and
//! mapping of HTTP failures into `ItineraryGenerationError`. Several API
//! keys can be configured; a key that answers with a quota failure is
//! skipped and the next one is tried, remembering the last good index so
//! subsequent calls start there.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::ports::{ItineraryGenerationError, ItineraryGenerator};

const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct GenerateRequestDto<'a> {
    contents: Vec<ContentDto<'a>>,
}

#[derive(Debug, Serialize)]
struct ContentDto<'a> {
    parts: Vec<PartDto<'a>>,
}

#[derive(Debug, Serialize)]
struct PartDto<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponseDto {
    #[serde(default)]
    candidates: Vec<CandidateDto>,
}

#[derive(Debug, Deserialize)]
struct CandidateDto {
    content: CandidateContentDto,
}

#[derive(Debug, Deserialize)]
struct CandidateContentDto {
    #[serde(default)]
    parts: Vec<CandidatePartDto>,
}

#[derive(Debug, Deserialize)]
struct CandidatePartDto {
    #[serde(default)]
    text: String,
}

/// Gemini generator adapter with API key rotation.
pub struct GeminiGenerator {
    client: Client,
    endpoint: String,
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl GeminiGenerator {
    /// Build an adapter over the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(keys: Vec<String>) -> Result<Self, reqwest::Error> {
        Self::with_endpoint(keys, GEMINI_ENDPOINT.to_owned())
    }

    /// Build an adapter against an explicit endpoint, for tests.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_endpoint(keys: Vec<String>, endpoint: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        // Start rotation at a random key so restarted replicas do not all
        // spend the first key's quota.
        let start = if keys.is_empty() {
            0
        } else {
            rand::thread_rng().gen_range(0..keys.len())
        };
        Ok(Self {
            client,
            endpoint,
            keys,
            cursor: AtomicUsize::new(start),
        })
    }

    /// Number of configured keys.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    async fn call_with_key(&self, key: &str, prompt: &str) -> Result<String, KeyFailure> {
        let body = GenerateRequestDto {
            contents: vec![ContentDto {
                parts: vec![PartDto { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|error| KeyFailure::Fatal(error.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|error| KeyFailure::Fatal(error.to_string()))?;

        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::FORBIDDEN {
            return Err(KeyFailure::Spent(format!("status {status}")));
        }
        if !status.is_success() {
            if looks_like_quota_failure(&text) {
                return Err(KeyFailure::Spent(format!("status {status}")));
            }
            return Err(KeyFailure::Fatal(format!("status {status}")));
        }

        let decoded: GenerateResponseDto = serde_json::from_str(&text)
            .map_err(|error| KeyFailure::Fatal(format!("decode response: {error}")))?;
        let itinerary: String = decoded
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();
        if itinerary.is_empty() {
            return Err(KeyFailure::Fatal("empty completion".to_owned()));
        }
        Ok(itinerary)
    }
}

/// Per-key failure classification; spent keys trigger rotation.
enum KeyFailure {
    /// The key hit its quota; try the next one.
    Spent(String),
    /// Transport or decode failure that rotation cannot fix.
    Fatal(String),
}

fn looks_like_quota_failure(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    ["quota", "rate limit", "resource_exhausted", "429"]
        .iter()
        .any(|marker| lowered.contains(marker))
}

#[async_trait]
impl ItineraryGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ItineraryGenerationError> {
        if self.keys.is_empty() {
            return Err(ItineraryGenerationError::NotConfigured);
        }

        let start = self.cursor.load(Ordering::Relaxed) % self.keys.len();
        let mut last_spent = String::new();
        for offset in 0..self.keys.len() {
            let index = (start + offset) % self.keys.len();
            match self.call_with_key(&self.keys[index], prompt).await {
                Ok(itinerary) => {
                    self.cursor.store(index, Ordering::Relaxed);
                    return Ok(itinerary);
                }
                Err(KeyFailure::Spent(message)) => {
                    warn!(key_index = index, %message, "rotating past spent key");
                    last_spent = message;
                }
                Err(KeyFailure::Fatal(message)) => {
                    return Err(ItineraryGenerationError::upstream(message));
                }
            }
        }
        Err(ItineraryGenerationError::exhausted(last_spent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("You have exceeded your quota for today", true)]
    #[case("RESOURCE_EXHAUSTED", true)]
    #[case("rate limit hit", true)]
    #[case("invalid request body", false)]
    fn quota_failures_are_recognised(#[case] body: &str, #[case] expected: bool) {
        assert_eq!(looks_like_quota_failure(body), expected);
    }

    #[tokio::test]
    async fn no_keys_is_not_configured() {
        let generator =
            GeminiGenerator::with_endpoint(Vec::new(), "http://localhost:1/never".to_owned())
                .expect("client builds");

        let error = generator.generate("prompt").await.expect_err("no keys");
        assert_eq!(error, ItineraryGenerationError::NotConfigured);
    }
}
