use anyhow::{Context, Result};
use kingchat_ollama::{GenerateOptions, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::history::DEFAULT_MAX_MESSAGES;
use crate::persona::Persona;

/// Points at an alternative config file
pub const CONFIG_ENV: &str = "KINGCHAT_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Web page server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Ollama connection and model choices
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Sampling options sent with every request
    #[serde(default)]
    pub generation: GenerateOptions,

    /// Chat history settings
    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub persona: Persona,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout, including the streamed body
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Models offered in the selector
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    #[serde(default = "default_model")]
    pub default_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Messages displayed; twice this many are kept
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

fn default_port() -> u16 {
    8501
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_models() -> Vec<String> {
    vec![
        "phi".to_string(),
        "mistral:7b-instruct-q4".to_string(),
        "llama2:4bit".to_string(),
    ]
}

fn default_model() -> String {
    "phi".to_string()
}

fn default_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            models: default_models(),
            default_model: default_model(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
        }
    }
}

impl OllamaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_known_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }
}

impl Config {
    /// Get the base directory: ~/.config/kingchat/
    pub fn base_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("USERPROFILE").map(PathBuf::from))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(home.join(".config").join("kingchat"))
    }

    /// Get the config file path: $KINGCHAT_CONFIG or ~/.config/kingchat/config.toml
    pub fn config_path() -> Result<PathBuf> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => Ok(Self::base_dir()?.join("config.toml")),
        }
    }

    /// Load config from default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from a file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))?
        } else {
            Config::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.ollama.models.is_empty() {
            anyhow::bail!("ollama.models must list at least one model");
        }
        if !self.ollama.is_known_model(&self.ollama.default_model) {
            anyhow::bail!(
                "ollama.default_model '{}' is not one of ollama.models ({})",
                self.ollama.default_model,
                self.ollama.models.join(", ")
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo() {
        let config = Config::default();
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.ollama.default_model, "phi");
        assert_eq!(config.ollama.models.len(), 3);
        assert_eq!(config.chat.max_messages, 10);
        assert_eq!(config.generation, GenerateOptions::default());
        config.validate().unwrap();
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 8501);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[server]\nport = 9000\n\n[generation]\ntemperature = 0.3\n\n[persona]\nname = \"King James\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!((config.generation.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.generation.num_ctx, 512);
        assert_eq!(config.persona.name, "King James");
        assert_eq!(config.persona.input_placeholder, "Ask LeBron something");
    }

    #[test]
    fn save_then_load_keeps_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.ollama.models.push("llama3.2".to_string());
        config.ollama.default_model = "llama3.2".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.ollama.default_model, "llama3.2");
        assert_eq!(loaded.ollama.models.len(), 4);
    }

    #[test]
    fn default_model_must_be_listed() {
        let mut config = Config::default();
        config.ollama.default_model = "gpt-oss".to_string();
        assert!(config.validate().is_err());

        config.ollama.models.clear();
        assert!(config.validate().is_err());
    }
}
