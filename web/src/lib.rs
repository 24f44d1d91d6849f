//! kingchat_web - HTTP server for the chat page
//!
//! This crate provides the server that:
//! - Serves the single chat page
//! - Keeps one chat session per browser, keyed by cookie
//! - Streams replies from Ollama to the page as server-sent events

pub mod api;
pub mod page;
pub mod server;
pub mod session;
pub mod state;

pub use server::{router, run_server};
pub use state::AppState;
