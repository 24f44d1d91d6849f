use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::types::{GenerateRequest, ModelTag};

/// Text fragments of one reply, in arrival order. A failure ends the stream.
pub type FragmentReceiver = mpsc::Receiver<Result<String>>;

/// Something that turns a prompt into streamed text
#[async_trait]
pub trait Backend: Send + Sync {
    /// Start generation and return a channel receiver for fragments
    async fn generate_stream(&self, request: GenerateRequest) -> Result<FragmentReceiver>;

    /// Run generation to completion and concatenate the fragments
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let mut rx = self.generate_stream(request).await?;
        let mut text = String::new();
        while let Some(fragment) = rx.recv().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }

    /// Models available to generate with
    async fn list_models(&self) -> Result<Vec<ModelTag>>;
}
