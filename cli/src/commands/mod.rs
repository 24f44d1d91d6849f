pub mod ask;
pub mod chat;
pub mod config;
pub mod models;
pub mod serve;
pub mod status;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use kingchat_core::{ChatSession, Config};
use kingchat_ollama::OllamaClient;
use std::sync::Arc;
use std::time::Duration;

pub fn ollama_client(config: &Config) -> Result<OllamaClient> {
    Ok(OllamaClient::new(
        config.ollama.base_url.clone(),
        config.ollama.timeout(),
    )?)
}

/// A session on the configured default model, or on `model` if given
pub fn new_session(config: &Config, model: Option<&str>) -> Result<ChatSession> {
    let mut session = ChatSession::from_config(config, Arc::new(config.persona.clone()));
    if let Some(model) = model {
        session.select_model(model, &config.ollama.models)?;
    }
    Ok(session)
}

pub fn thinking_spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
