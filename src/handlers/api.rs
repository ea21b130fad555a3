// src/handlers/api.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError, models::question::GenerateQuestionRequest,
    services::generator::QuestionSource,
};

/// Generates a single question outside of any quiz session.
///
/// Missing `difficulty`/`topic` default to unconstrained. Bodies that are not
/// a JSON object of that shape are answered with the usual JSON error body.
pub async fn generate_question(
    State(generator): State<Arc<dyn QuestionSource>>,
    payload: Result<Json<GenerateQuestionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    payload.validate()?;

    let question = generator.generate(&payload.criteria()).await?;

    Ok(Json(question))
}
