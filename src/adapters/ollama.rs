use crate::domain::model::{ChatMessage, ChatRequest};
use crate::domain::ports::InferenceClient;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// 本機 Ollama 服務的 HTTP client
///
/// 不設 timeout、不重試：服務卡住時整個批次也會停住。
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    endpoint: String,
}

impl OllamaClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// 列出已經 `ollama pull` 過的模型
    pub async fn available_models(&self) -> Result<Vec<String>> {
        let url = self.url("/api/tags");
        tracing::debug!("Listing local models from: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::InferenceError {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|tag| tag.name).collect())
    }

    pub async fn has_model(&self, model: &str) -> Result<bool> {
        let tagged = format!("{}:latest", model);
        Ok(self
            .available_models()
            .await?
            .iter()
            .any(|name| name == model || *name == tagged))
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let url = self.url("/api/chat");
        tracing::debug!("Sending chat request to {} (model: {})", url, request.model);

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        tracing::debug!("Inference response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Ollama 的錯誤格式為 {"error": "..."}
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| value.get("error")?.as_str().map(str::to_string))
                .unwrap_or(body);
            return Err(EtlError::InferenceError {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;
        Ok(body.message.content)
    }
}
