// src/handlers/chat.rs

use axum::{
    Extension, Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::AppError, models::session::QuizPhase, services::session_store::SessionStore,
    utils::session_cookie::SessionId, views,
};

/// Chat side view. Opening it pauses a running quiz.
pub async fn chat(
    State(sessions): State<SessionStore>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> impl IntoResponse {
    sessions.with_session(id, |session| {
        if session.pause() {
            tracing::debug!("Quiz paused at question {}", session.current_index() + 1);
        }
        views::chat(session.chat_log(), session.phase() == QuizPhase::Paused)
    })
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChatForm {
    #[serde(default)]
    #[validate(length(max = 1000, message = "Nachricht ist zu lang"))]
    pub message: String,
}

pub async fn chat_message(
    State(sessions): State<SessionStore>,
    Extension(SessionId(id)): Extension<SessionId>,
    Form(form): Form<ChatForm>,
) -> Result<Redirect, AppError> {
    form.validate()?;

    sessions.with_session(id, |session| session.push_chat(&form.message));
    Ok(Redirect::to("/chat"))
}

pub async fn resume_quiz(
    State(sessions): State<SessionStore>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Redirect {
    sessions.with_session(id, |session| session.resume());
    Redirect::to("/quiz")
}
