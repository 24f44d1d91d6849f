//! Ollama API wire types.
//!
//! Ollama API docs: https://github.com/ollama/ollama/blob/main/docs/api.md

use serde::{Deserialize, Serialize};

// ============================================================================
// POST /api/generate
// ============================================================================

/// Sampling options sent with every generate request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Context window size in tokens
    #[serde(default = "default_num_ctx")]
    pub num_ctx: u32,

    /// Maximum number of tokens to generate (-1 = unbounded)
    #[serde(default = "default_num_predict")]
    pub num_predict: i32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_num_ctx() -> u32 {
    512
}

fn default_num_predict() -> i32 {
    256
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_k() -> u32 {
    40
}

fn default_top_p() -> f32 {
    0.9
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            num_ctx: default_num_ctx(),
            num_predict: default_num_predict(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: GenerateOptions,
}

impl GenerateRequest {
    /// Streaming request with the given options
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, options: GenerateOptions) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: true,
            options,
        }
    }
}

/// One line of a streamed generate response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateChunk {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_reason: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub eval_count: Option<u32>,
    #[serde(default)]
    pub total_duration: Option<u64>,
}

// ============================================================================
// GET /api/tags
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

/// A model installed on the Ollama server
#[derive(Debug, Clone, Deserialize)]
pub struct ModelTag {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub modified_at: Option<String>,
    #[serde(default)]
    pub details: Option<ModelDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelDetails {
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub parameter_size: Option<String>,
    #[serde(default)]
    pub quantization_level: Option<String>,
}

// ============================================================================
// GET /api/version
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct VersionResponse {
    pub version: String,
}
