//! kingchat_ollama - Client for a local Ollama server
//!
//! This crate provides:
//! - Wire types for `POST /api/generate` and `GET /api/tags`
//! - Incremental decoding of newline-delimited JSON responses
//! - The `Backend` trait the chat session talks to, and its reqwest implementation

pub mod backend;
pub mod client;
pub mod error;
pub mod ndjson;
pub mod types;

pub use backend::{Backend, FragmentReceiver};
pub use client::{OllamaClient, DEFAULT_BASE_URL};
pub use error::{OllamaError, Result};
pub use ndjson::{collect_response, decode_line, NdjsonDecoder};
pub use types::{GenerateChunk, GenerateOptions, GenerateRequest, ModelTag};
