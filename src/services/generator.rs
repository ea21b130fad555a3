// src/services/generator.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::{
    config::Config,
    models::question::{Criterion, Question, QuizCriteria},
};

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Http request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Api error: {0} - {1}")]
    Api(StatusCode, String),

    #[error("Invalid provider endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("Model returned no content")]
    EmptyResponse,

    #[error("Model output is not a question object: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Model output violates question rules: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Anything that can produce one question for the given criteria.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn generate(&self, criteria: &QuizCriteria) -> Result<Question, GenerationError>;
}

const SYSTEM_PROMPT_TEMPLATE: &str = "Du bist ein Experte für {exam} Prüfungsfragen.";

/// Builds the user prompt asking for exactly one question as pure JSON.
pub fn build_prompt(exam: &str, criteria: &QuizCriteria) -> String {
    let mut prompt = format!(
        "Generiere eine abwechslungsreiche Multiple-Choice Frage für die {} Prüfung.",
        exam
    );
    if let Criterion::Only(difficulty) = &criteria.difficulty {
        prompt.push_str(&format!(
            " Die Frage soll den Schwierigkeitsgrad '{}' haben.",
            difficulty
        ));
    }
    if let Criterion::Only(topic) = &criteria.topic {
        prompt.push_str(&format!(
            " Die Frage soll zum Themenbereich '{}' gehören.",
            topic
        ));
    }
    prompt.push_str(
        " Es sollen vier Antwortmöglichkeiten generiert werden, von denen nur eine korrekt ist. \
         Gib die Ausgabe als reines JSON zurück, im Format: \
         {\"question\": \"<Fragetext>\", \"choices\": [\"Antwort1\", \"Antwort2\", \"Antwort3\", \"Antwort4\"], \"correct\": \"<korrekte Antwort>\"} \
         ohne zusätzliche Erläuterungen oder Kommentare.",
    );
    prompt
}

/// Parses raw model output and enforces the question invariants.
pub fn parse_question(raw: &str) -> Result<Question, GenerationError> {
    let question: Question = serde_json::from_str(raw.trim())?;
    question.validate()?;
    Ok(question)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Generates questions through an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct LlmQuestionGenerator {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
    max_tokens: u32,
    exam: String,
}

impl LlmQuestionGenerator {
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.openai_timeout_secs))
            .build()?;

        let endpoint = config
            .openai_base_url
            .join("chat/completions")?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            max_tokens: config.openai_max_tokens,
            exam: config.exam_name.clone(),
        })
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GenerationError> {
        tracing::debug!("Calling model {} at {}", self.model, self.endpoint);

        let payload = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatRequestMessage {
                    role: "system",
                    content: system,
                },
                ChatRequestMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or("No response body".into());
            return Err(GenerationError::Api(status, body));
        }

        let completion: ChatResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}

#[async_trait]
impl QuestionSource for LlmQuestionGenerator {
    async fn generate(&self, criteria: &QuizCriteria) -> Result<Question, GenerationError> {
        let system = SYSTEM_PROMPT_TEMPLATE.replace("{exam}", &self.exam);
        let prompt = build_prompt(&self.exam, criteria);

        let content = self.complete(&system, &prompt).await?;
        parse_question(&content)
    }
}
