use anyhow::Result;
use kingchat_ollama::{Backend, GenerateOptions, GenerateRequest};
use std::fmt::Display;
use std::sync::Arc;

use crate::config::Config;
use crate::history::ChatHistory;
use crate::persona::Persona;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("Message is empty")]
    Empty,

    #[error("A reply is still being generated")]
    Busy,
}

/// A started exchange: the request to send and the id its reply is recorded under.
#[derive(Debug)]
pub struct Turn {
    pub id: u64,
    pub request: GenerateRequest,
}

/// One user's conversation: its history and the model it talks to.
#[derive(Debug, Clone)]
pub struct ChatSession {
    history: ChatHistory,
    model: String,
    persona: Arc<Persona>,
    options: GenerateOptions,
    next_turn: u64,
    // Turn whose reply is awaited; cleared by `clear` so a late reply is dropped
    pending: Option<u64>,
}

impl ChatSession {
    pub fn new(
        persona: Arc<Persona>,
        model: impl Into<String>,
        options: GenerateOptions,
        max_messages: usize,
    ) -> Self {
        Self {
            history: ChatHistory::new(max_messages),
            model: model.into(),
            persona,
            options,
            next_turn: 0,
            pending: None,
        }
    }

    pub fn from_config(config: &Config, persona: Arc<Persona>) -> Self {
        Self::new(
            persona,
            config.ollama.default_model.clone(),
            config.generation.clone(),
            config.chat.max_messages,
        )
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Switch to another model from the offered list
    pub fn select_model(&mut self, model: &str, allowed: &[String]) -> Result<()> {
        if !allowed.iter().any(|m| m == model) {
            anyhow::bail!("Unknown model '{}'. Choose one of: {}", model, allowed.join(", "));
        }
        if self.model != model {
            tracing::info!("Model switched from {} to {}", self.model, model);
            self.model = model.to_string();
        }
        Ok(())
    }

    /// Empty the history. A reply still being generated will not be recorded.
    pub fn clear(&mut self) {
        self.history.clear();
        self.pending = None;
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Record the user's message and build the request for the reply.
    pub fn begin_turn(&mut self, text: &str) -> std::result::Result<Turn, TurnError> {
        if text.trim().is_empty() {
            return Err(TurnError::Empty);
        }
        if self.pending.is_some() {
            return Err(TurnError::Busy);
        }

        let id = self.next_turn;
        self.next_turn += 1;
        self.pending = Some(id);

        self.history.push_user(text);
        Ok(Turn {
            id,
            request: GenerateRequest::new(
                self.model.clone(),
                self.persona.build_prompt(text),
                self.options.clone(),
            ),
        })
    }

    /// Record the reply to turn `id`. A failure is recorded as `Error: <message>`.
    ///
    /// The reply is returned either way, but it is only added to the history
    /// while `id` is still the pending turn.
    pub fn finish_turn<E: Display>(&mut self, id: u64, outcome: std::result::Result<String, E>) -> String {
        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(model = %self.model, "Generation failed: {}", e);
                format!("Error: {}", e)
            }
        };

        if self.pending == Some(id) {
            self.pending = None;
            self.history.push_assistant(reply.clone());
        } else {
            tracing::debug!(turn = id, "Dropping reply to a cleared turn");
        }
        reply
    }

    /// Run a full turn, passing each fragment to `on_fragment` as it arrives.
    ///
    /// Only a rejected message (`TurnError`) is an error; backend failures become the reply.
    pub async fn send<F>(&mut self, backend: &dyn Backend, text: &str, mut on_fragment: F) -> Result<String>
    where
        F: FnMut(&str),
    {
        let turn = self.begin_turn(text)?;
        let outcome = stream_reply(backend, turn.request, &mut on_fragment).await;
        Ok(self.finish_turn(turn.id, outcome))
    }
}

/// Forward fragments to `on_fragment` and concatenate them
pub async fn stream_reply<F>(
    backend: &dyn Backend,
    request: GenerateRequest,
    on_fragment: &mut F,
) -> kingchat_ollama::Result<String>
where
    F: FnMut(&str),
{
    let mut rx = backend.generate_stream(request).await?;
    let mut reply = String::new();
    while let Some(fragment) = rx.recv().await {
        let fragment = fragment?;
        on_fragment(&fragment);
        reply.push_str(&fragment);
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Role;
    use async_trait::async_trait;
    use kingchat_ollama::{FragmentReceiver, ModelTag, OllamaError};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Replies with fixed fragments, or fails, and remembers prompts
    struct Scripted {
        fragments: Vec<&'static str>,
        fail_after: Option<usize>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl Scripted {
        fn new(fragments: Vec<&'static str>) -> Self {
            Self {
                fragments,
                fail_after: None,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Backend for Scripted {
        async fn generate_stream(&self, request: GenerateRequest) -> kingchat_ollama::Result<FragmentReceiver> {
            self.prompts.lock().unwrap().push((request.model, request.prompt));
            let (tx, rx) = mpsc::channel(16);
            for (i, fragment) in self.fragments.iter().enumerate() {
                if self.fail_after == Some(i) {
                    tx.send(Err(OllamaError::Server("model crashed".to_string()))).await.unwrap();
                    return Ok(rx);
                }
                tx.send(Ok(fragment.to_string())).await.unwrap();
            }
            Ok(rx)
        }

        async fn list_models(&self) -> kingchat_ollama::Result<Vec<ModelTag>> {
            Ok(Vec::new())
        }
    }

    fn session() -> ChatSession {
        ChatSession::from_config(&Config::default(), Arc::new(Persona::default()))
    }

    #[tokio::test]
    async fn send_records_both_sides() {
        let backend = Scripted::new(vec!["Akron ", "made ", "me."]);
        let mut session = session();

        let mut seen = Vec::new();
        let reply = session
            .send(&backend, "Where are you from?", |f| seen.push(f.to_string()))
            .await
            .unwrap();

        assert_eq!(reply, "Akron made me.");
        assert_eq!(seen, vec!["Akron ", "made ", "me."]);

        let messages = session.history().all();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "Where are you from?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Akron made me.");

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts[0].0, "phi");
        assert!(prompts[0].1.ends_with("User: Where are you from?\nLeBron James:"));
    }

    #[tokio::test]
    async fn failure_becomes_error_reply() {
        let mut backend = Scripted::new(vec!["partial ", "never"]);
        backend.fail_after = Some(1);
        let mut session = session();

        let reply = session.send(&backend, "hi", |_| {}).await.unwrap();
        assert_eq!(reply, "Error: model crashed");
        assert_eq!(session.history().all()[1].content, "Error: model crashed");
    }

    #[tokio::test]
    async fn empty_message_records_nothing() {
        let backend = Scripted::new(vec!["x"]);
        let mut session = session();

        assert!(session.send(&backend, "   ", |_| {}).await.is_err());
        assert!(session.history().is_empty());
        assert!(backend.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn prompt_excludes_earlier_turns() {
        let backend = Scripted::new(vec!["ok"]);
        let mut session = session();

        session.send(&backend, "first question", |_| {}).await.unwrap();
        session.send(&backend, "second question", |_| {}).await.unwrap();

        let prompts = backend.prompts.lock().unwrap();
        assert!(!prompts[1].1.contains("first question"));
        assert_eq!(session.history().len(), 4);
    }

    #[tokio::test]
    async fn selected_model_is_used() {
        let backend = Scripted::new(vec!["ok"]);
        let config = Config::default();
        let mut session = session();

        session
            .select_model("mistral:7b-instruct-q4", &config.ollama.models)
            .unwrap();
        session.send(&backend, "hi", |_| {}).await.unwrap();

        assert_eq!(backend.prompts.lock().unwrap()[0].0, "mistral:7b-instruct-q4");
    }

    #[test]
    fn unknown_model_is_rejected() {
        let config = Config::default();
        let mut session = session();
        assert!(session.select_model("gpt-4", &config.ollama.models).is_err());
        assert_eq!(session.model(), "phi");
    }

    #[test]
    fn history_stays_capped_across_turns() {
        let mut session = session();
        for i in 0..30 {
            let turn = session.begin_turn(&format!("q{}", i)).unwrap();
            session.finish_turn::<String>(turn.id, Ok(format!("a{}", i)));
        }
        assert_eq!(session.history().len(), 20);
        assert_eq!(session.history().visible().len(), 10);
    }

    #[test]
    fn second_turn_waits_for_the_first() {
        let mut session = session();
        let first = session.begin_turn("first").unwrap();

        assert_eq!(session.begin_turn("second").unwrap_err(), TurnError::Busy);
        assert_eq!(session.history().len(), 1);

        session.finish_turn::<String>(first.id, Ok("one".to_string()));
        assert!(!session.is_busy());
        session.begin_turn("second").unwrap();
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn reply_after_clear_is_dropped() {
        let mut session = session();
        let turn = session.begin_turn("still there?").unwrap();
        session.clear();

        let reply = session.finish_turn::<String>(turn.id, Ok("late reply".to_string()));
        assert_eq!(reply, "late reply");
        assert!(session.history().is_empty());
        assert!(!session.is_busy());
    }

    #[test]
    fn stale_reply_does_not_land_in_the_next_turn() {
        let mut session = session();
        let stale = session.begin_turn("old").unwrap();
        session.clear();
        let current = session.begin_turn("new").unwrap();

        session.finish_turn::<String>(stale.id, Ok("old answer".to_string()));
        assert!(session.is_busy());
        session.finish_turn::<String>(current.id, Ok("new answer".to_string()));

        let contents: Vec<_> = session.history().all().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["new", "new answer"]);
    }

    #[tokio::test]
    async fn empty_message_does_not_start_a_turn() {
        let backend = Scripted::new(vec!["ok"]);
        let mut session = session();

        assert_eq!(session.begin_turn(" ").unwrap_err(), TurnError::Empty);
        assert!(!session.is_busy());
        assert_eq!(session.send(&backend, "hi", |_| {}).await.unwrap(), "ok");
    }
}
