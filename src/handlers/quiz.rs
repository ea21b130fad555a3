// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    config::Config,
    models::{
        question::StartQuizForm,
        session::{CurrentView, SubmitOutcome},
    },
    services::{
        assembly::{AssemblyPlan, assemble_quiz},
        generator::QuestionSource,
        session_store::SessionStore,
    },
    utils::session_cookie::SessionId,
    views,
};

pub const EMPTY_QUIZ_MESSAGE: &str =
    "Konnte nicht genügend Fragen generieren. Bitte versuchen Sie es mit anderen Kriterien.";

/// Renders the start page, consuming any flashed message.
pub async fn index(
    State(config): State<Config>,
    State(sessions): State<SessionStore>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> impl IntoResponse {
    let flash = sessions.with_session(id, |session| session.take_flash());
    views::index(&config.exam_name, flash.as_deref())
}

/// Generates a new quiz and stores it in the caller's session.
///
/// * God mode ignores the submitted difficulty and topic.
/// * Runs the whole (sequential) assembly before touching the session.
/// * Zero questions: nothing is stored, the start page shows a warning.
pub async fn start(
    State(config): State<Config>,
    State(sessions): State<SessionStore>,
    State(generator): State<Arc<dyn QuestionSource>>,
    Extension(SessionId(id)): Extension<SessionId>,
    Form(form): Form<StartQuizForm>,
) -> Redirect {
    let criteria = form.criteria();
    tracing::info!(
        "Starting quiz (difficulty: {}, topic: {})",
        criteria.difficulty.label(),
        criteria.topic.label()
    );

    let questions = assemble_quiz(generator.as_ref(), &criteria, AssemblyPlan::from(&config)).await;

    if questions.is_empty() {
        tracing::warn!("No questions could be generated, aborting quiz start");
        sessions.with_session(id, |session| session.set_flash(EMPTY_QUIZ_MESSAGE));
        return Redirect::to("/");
    }

    sessions.with_session(id, |session| session.start(questions));
    Redirect::to("/quiz")
}

/// Shows the current question, or moves on to results / chat.
pub async fn quiz(
    State(sessions): State<SessionStore>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Response {
    sessions.with_session(id, |session| match session.view_current() {
        CurrentView::Question {
            question,
            position,
            total,
            score,
        } => views::quiz(question, position, total, score).into_response(),
        CurrentView::Paused => Redirect::to("/chat").into_response(),
        CurrentView::Finished => Redirect::to("/results").into_response(),
    })
}

#[derive(Debug, Deserialize)]
pub struct AnswerForm {
    pub answer: Option<String>,
}

/// Records the answer for the current question.
pub async fn submit_answer(
    State(sessions): State<SessionStore>,
    Extension(SessionId(id)): Extension<SessionId>,
    Form(form): Form<AnswerForm>,
) -> Redirect {
    let outcome = sessions.with_session(id, |session| session.submit_answer(form.answer));

    match outcome {
        SubmitOutcome::Recorded { is_correct } => {
            tracing::debug!("Answer recorded (correct: {})", is_correct);
            Redirect::to("/quiz")
        }
        SubmitOutcome::Paused => Redirect::to("/chat"),
        SubmitOutcome::NoActiveQuestion => Redirect::to("/results"),
    }
}

/// Shows score and answer log for whatever is stored in the session.
pub async fn results(
    State(sessions): State<SessionStore>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> impl IntoResponse {
    sessions.with_session(id, |session| views::results(&session.view_results()))
}
