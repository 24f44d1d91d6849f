//! The chat page. Persona text is filled in server side; the transcript is
//! loaded and streamed by the page script through `/api/*`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use kingchat_core::Persona;
use minijinja::{context, AutoEscape, Environment};
use std::sync::Arc;

use crate::session::SessionId;
use crate::state::AppState;

const INDEX_TEMPLATE: &str = include_str!("../assets/index.html");

pub async fn index(State(state): State<Arc<AppState>>, session: SessionId) -> Response {
    match render(&state.persona) {
        Ok(html) => (session, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render page: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, session, "failed to render page").into_response()
        }
    }
}

pub fn render(persona: &Persona) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.add_template("index.html", INDEX_TEMPLATE)?;
    env.get_template("index.html")?.render(context! { persona })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_persona_fields() {
        let html = render(&Persona::default()).unwrap();

        assert!(html.contains("<title>LeBron James Chat</title>"));
        assert!(html.contains("Chat with LeBron James 👑🏀"));
        assert!(html.contains("<li>4× MVP</li>"));
        assert!(html.contains(r#"placeholder="Ask LeBron something""#));
        assert!(html.contains("1966.png&amp;w=350&amp;h=254"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn persona_text_is_escaped() {
        let persona = Persona {
            title: "<script>alert(1)</script>".to_string(),
            ..Persona::default()
        };
        let html = render(&persona).unwrap();
        assert!(html.contains("&lt;script&gt;alert(1)"));
        assert!(!html.contains("<script>alert(1)"));
    }

    #[test]
    fn template_syntax_in_persona_text_stays_literal() {
        let persona = Persona {
            title: "{{ persona.hint }}".to_string(),
            quick_stats: vec!["{% if true %}yes{% endif %}".to_string()],
            ..Persona::default()
        };
        let html = render(&persona).unwrap();

        assert!(html.contains("<h1>{{ persona.hint }}</h1>"));
        assert!(html.contains("<li>{% if true %}yes{% endif %}</li>"));
        assert_eq!(html.matches("try clearing the chat").count(), 1);
    }
}
