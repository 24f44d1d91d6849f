//! Cookie-keyed browser sessions.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponseParts, ResponseParts},
};
use std::convert::Infallible;
use std::sync::Arc;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "kingchat_session";

/// The caller's session. Responses carrying a new one set the cookie.
#[derive(Debug, Clone)]
pub struct SessionId {
    pub id: String,
    pub is_new: bool,
}

impl SessionId {
    pub fn new(id: String) -> Self {
        Self { id, is_new: true }
    }

    pub fn existing(id: &str) -> Self {
        Self {
            id: id.to_string(),
            is_new: false,
        }
    }

    fn set_cookie(&self) -> String {
        format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, self.id)
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for SessionId {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let existing = cookie_value(&parts.headers, SESSION_COOKIE);
        Ok(state.resolve_session(existing.as_deref()).await)
    }
}

impl IntoResponseParts for SessionId {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if self.is_new {
            if let Ok(value) = HeaderValue::from_str(&self.set_cookie()) {
                res.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        Ok(res)
    }
}

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
