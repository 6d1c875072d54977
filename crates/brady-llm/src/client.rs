use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use brady_core::interfaces::OptionGenerator;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{LlmError, LlmResult};
use crate::prompt;

/// Request body for the generation endpoint.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

/// One entry of the seed document: `option` is the canonical spoken/compared
/// value, `text` the (possibly shorter) display label.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionEntry {
    pub option: String,
    #[serde(default)]
    pub text: String,
}

/// HTTP client for the option-generation backend.
#[derive(Debug)]
pub struct BackendClient {
    base_url: Url,
    client: reqwest::Client,
}

impl BackendClient {
    /// The request timeout bounds a hung backend; it degrades through the
    /// same failure path as a refused connection.
    pub fn new(base_url: &str, timeout: Duration) -> LlmResult<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| LlmError::ConfigError(format!("Invalid base URL {base_url}: {e}")))?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::ConfigError(format!("HTTP client: {e}")))?;

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> LlmResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| LlmError::ConfigError(format!("Endpoint {path}: {e}")))
    }

    /// Ask the backend for options to a spoken question. Returns the raw
    /// response body; the scan layer normalizes it.
    pub async fn generate_options(&self, question: &str) -> LlmResult<String> {
        let url = self.endpoint("llm")?;
        let prompt = prompt::options_prompt(question);
        tracing::debug!("Option query to {url}");

        let resp = self
            .client
            .post(url)
            .json(&GenerateRequest { prompt: &prompt })
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::BadStatus { status, body });
        }

        resp.text()
            .await
            .map_err(|e| LlmError::ParseError(format!("Response body: {e}")))
    }

    /// Fetch the default board seed from the backend.
    pub async fn fetch_seed_options(&self) -> LlmResult<Vec<OptionEntry>> {
        let url = self.endpoint("options.json")?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::BadStatus { status, body });
        }

        resp.json::<Vec<OptionEntry>>()
            .await
            .map_err(|e| LlmError::ParseError(format!("Seed document: {e}")))
    }
}

/// Read a seed document from disk — the offline fallback when the backend
/// is unreachable at startup.
pub fn load_seed_file(path: &Path) -> LlmResult<Vec<OptionEntry>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| LlmError::ConfigError(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| LlmError::ParseError(format!("{}: {e}", path.display())))
}

#[async_trait]
impl OptionGenerator for BackendClient {
    async fn generate(&self, question: &str) -> anyhow::Result<String> {
        Ok(self.generate_options(question).await?)
    }
}
