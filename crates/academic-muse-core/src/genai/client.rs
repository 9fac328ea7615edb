use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::prompt::Prompt;
use crate::error::GenAiError;
use crate::storage::AiConfig;

pub const API_URL_VAR: &str = "MUSE_AI_URL";
pub const API_KEY_VAR: &str = "MUSE_AI_KEY";
pub const MODEL_VAR: &str = "MUSE_AI_MODEL";

/// Endpoint, credential and model for the completion endpoint.
#[derive(Clone)]
pub struct AiSettings {
    pub url: String,
    pub api_key: String,
    pub model: String,
}

impl std::fmt::Debug for AiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiSettings")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl AiSettings {
    /// Read settings from the process environment.
    ///
    /// # Errors
    /// Fails if the endpoint URL or the key is missing or empty.
    pub fn from_env(cfg: &AiConfig) -> Result<Self, GenAiError> {
        Self::from_lookup(cfg, |name| std::env::var(name).ok())
    }

    pub fn from_lookup(
        cfg: &AiConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, GenAiError> {
        let get = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());
        let url = get(API_URL_VAR).ok_or(GenAiError::NotConfigured(API_URL_VAR))?;
        let api_key = get(API_KEY_VAR).ok_or(GenAiError::NotConfigured(API_KEY_VAR))?;
        let model = get(MODEL_VAR).unwrap_or_else(|| cfg.model.clone());
        Ok(Self {
            url,
            api_key,
            model,
        })
    }
}

pub struct TextGenClient {
    http: Client,
    settings: AiSettings,
}

impl TextGenClient {
    pub fn new(settings: AiSettings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }

    /// Send one completion request and return the generated text.
    ///
    /// A response without generated text yields an empty string. No retries.
    pub async fn generate(&self, prompt: &Prompt) -> Result<String, GenAiError> {
        let body = json!({
            "model": self.settings.model,
            "messages": [{ "role": "user", "content": prompt.render() }],
            "temperature": prompt.temperature(),
        });

        debug!(
            url = %self.settings.url,
            model = %self.settings.model,
            "sending completion request"
        );
        let resp = self
            .http
            .post(&self.settings.url)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenAiError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = resp.json().await?;
        Ok(extract_content(&data))
    }
}

fn extract_content(data: &Value) -> String {
    data.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
