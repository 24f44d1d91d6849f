use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::backend::{Backend, FragmentReceiver};
use crate::error::{OllamaError, Result};
use crate::ndjson::{decode_line, NdjsonDecoder};
use crate::types::{GenerateRequest, ModelTag, TagsResponse, VersionResponse};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Fragments buffered between the reader task and the consumer
const FRAGMENT_BUFFER: usize = 64;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Server version, also serves as a reachability check
    pub async fn version(&self) -> Result<String> {
        let response = check_status(self.http.get(self.url("/api/version")).send().await?).await?;
        let version: VersionResponse = response.json().await?;
        Ok(version.version)
    }
}

#[async_trait]
impl Backend for OllamaClient {
    async fn generate_stream(&self, request: GenerateRequest) -> Result<FragmentReceiver> {
        tracing::debug!(model = %request.model, prompt_len = request.prompt.len(), "POST /api/generate");

        let response = self
            .http
            .post(self.url("/api/generate"))
            .json(&request)
            .send()
            .await?;
        let response = check_status(response).await?;

        let (tx, rx) = mpsc::channel(FRAGMENT_BUFFER);
        tokio::spawn(pump_fragments(response, tx));
        Ok(rx)
    }

    async fn list_models(&self) -> Result<Vec<ModelTag>> {
        let response = check_status(self.http.get(self.url("/api/tags")).send().await?).await?;
        let tags: TagsResponse = response.json().await?;
        Ok(tags.models)
    }
}

/// Read the NDJSON body and forward each `response` fragment until the body
/// ends, a line fails to decode, or the receiver goes away.
async fn pump_fragments(response: Response, tx: mpsc::Sender<Result<String>>) {
    let mut stream = response.bytes_stream();
    let mut decoder = NdjsonDecoder::new();

    while let Some(chunk) = stream.next().await {
        let lines = match chunk.map_err(OllamaError::from).and_then(|bytes| decoder.push(&bytes)) {
            Ok(lines) => lines,
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                return;
            }
        };
        for line in lines {
            if !forward_line(&tx, &line).await {
                return;
            }
        }
    }

    match decoder.finish() {
        Ok(Some(line)) => {
            forward_line(&tx, &line).await;
        }
        Ok(None) => {}
        Err(e) => {
            let _ = tx.send(Err(e)).await;
        }
    }
}

/// Returns false when the stream should stop
async fn forward_line(tx: &mpsc::Sender<Result<String>>, line: &str) -> bool {
    match decode_line(line) {
        Ok(Some(chunk)) => {
            if chunk.done {
                tracing::debug!(
                    eval_count = ?chunk.eval_count,
                    done_reason = ?chunk.done_reason,
                    "generation finished"
                );
            }
            match chunk.response {
                Some(text) if !text.is_empty() => tx.send(Ok(text)).await.is_ok(),
                _ => true,
            }
        }
        Ok(None) => true,
        Err(e) => {
            tracing::warn!("Stream error: {}", e);
            let _ = tx.send(Err(e)).await;
            false
        }
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(OllamaError::Status {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Ollama reports failures as `{"error": "..."}`; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = OllamaClient::new("http://localhost:11434/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("/api/tags"), "http://localhost:11434/api/tags");
    }

    #[test]
    fn error_message_prefers_error_field() {
        assert_eq!(error_message(r#"{"error":"model not found"}"#), "model not found");
        assert_eq!(error_message("404 page not found\n"), "404 page not found");
    }
}
