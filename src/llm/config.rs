//! Environment-driven configuration

use super::GenerationParams;
use crate::runtime::SessionConfig;
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the model transport and the session it feeds
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible endpoint (defaults to api.openai.com)
    pub base_url: Option<String>,
    pub generation: GenerationParams,
    pub max_iterations: Option<u32>,
    pub request_timeout: Option<Duration>,
    pub tool_timeout: Option<Duration>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let defaults = GenerationParams::default();
        Self {
            api_key: first_non_blank([
                std::env::var("STEPWISE_API_KEY").ok(),
                std::env::var("OPENAI_API_KEY").ok(),
            ]),
            base_url: std::env::var("STEPWISE_BASE_URL").ok(),
            generation: GenerationParams {
                model: std::env::var("STEPWISE_MODEL").unwrap_or(defaults.model),
                temperature: parse_var("STEPWISE_TEMPERATURE").unwrap_or(defaults.temperature),
                max_tokens: parse_var("STEPWISE_MAX_TOKENS").unwrap_or(defaults.max_tokens),
            },
            max_iterations: parse_var("STEPWISE_MAX_ITERATIONS"),
            request_timeout: parse_var("STEPWISE_REQUEST_TIMEOUT_SECS").map(Duration::from_secs),
            tool_timeout: parse_var("STEPWISE_TOOL_TIMEOUT_SECS").map(Duration::from_secs),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Session settings derived from this configuration.
    ///
    /// A missing key is passed through as an empty string; the session
    /// reports it on the first `run`.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            api_key: self.api_key.clone().unwrap_or_default(),
            generation: self.generation.clone(),
            max_iterations: self.max_iterations,
            request_timeout: self.request_timeout,
        }
    }
}

/// First candidate with non-whitespace content
fn first_non_blank(candidates: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Ignoring unparseable environment variable");
            None
        }
    }
}
