//! kingchat_core - Core library for persona chat
//!
//! This crate provides:
//! - Configuration loaded from ~/.config/kingchat/config.toml
//! - The persona and how it frames a prompt
//! - Capped chat history and the per-user chat session

pub mod config;
pub mod history;
pub mod persona;
pub mod session;

pub use config::Config;
pub use history::{ChatHistory, Message, Role};
pub use persona::Persona;
pub use session::{ChatSession, Turn, TurnError};
