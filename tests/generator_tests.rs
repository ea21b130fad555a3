// tests/generator_tests.rs

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use exam_trainer::{
    config::{Config, parse_base_url},
    models::question::QuizCriteria,
    routes,
    services::{
        generator::{GenerationError, LlmQuestionGenerator, QuestionSource},
        session_store::SessionStore,
    },
    state::AppState,
};
use serde_json::{Value, json};

/// What the fake provider answers, and what it was asked.
#[derive(Clone)]
struct MockProvider {
    status: StatusCode,
    content: Option<String>,
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn chat_completions(
    State(mock): State<MockProvider>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    mock.requests.lock().unwrap().push((auth, body));

    if !mock.status.is_success() {
        return (mock.status, Json(json!({ "error": { "message": "rate limited" } })));
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": mock.content },
                "finish_reason": "stop"
            }]
        })),
    )
}

/// Spawns a fake chat completions provider. Returns its base url and the request log.
async fn spawn_provider(
    status: StatusCode,
    content: Option<&str>,
) -> (String, Arc<Mutex<Vec<(Option<String>, Value)>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let mock = MockProvider {
        status,
        content: content.map(str::to_string),
        requests: requests.clone(),
    };

    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://127.0.0.1:{}/v1", port), requests)
}

fn config_for(base_url: &str) -> Config {
    Config {
        openai_api_key: "sk-test".to_string(),
        openai_base_url: parse_base_url(base_url).unwrap(),
        openai_model: "gpt-4o-mini".to_string(),
        openai_max_tokens: 1500,
        openai_timeout_secs: 5,
        exam_name: "PCEP".to_string(),
        question_count: 3,
        max_attempts_per_slot: 3,
        session_secret: "generator_test_secret".to_string(),
        session_ttl_secs: 600,
        port: 0,
        rust_log: "error".to_string(),
    }
}

const VALID_OUTPUT: &str =
    r#"{"question": "Welchen Typ hat 3/2?", "choices": ["int", "float", "str", "bool"], "correct": "float"}"#;

#[tokio::test]
async fn generator_sends_prompt_and_parses_answer() {
    let (base_url, requests) = spawn_provider(StatusCode::OK, Some(VALID_OUTPUT)).await;
    let generator = LlmQuestionGenerator::from_config(&config_for(&base_url)).unwrap();

    let question = generator
        .generate(&QuizCriteria::new(Some("leicht"), Some("alle")))
        .await
        .unwrap();

    assert_eq!(question.text, "Welchen Typ hat 3/2?");
    assert_eq!(question.choices, vec!["int", "float", "str", "bool"]);
    assert_eq!(question.correct_choice, "float");

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["max_tokens"], 1500);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");

    let prompt = body["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.contains("Schwierigkeitsgrad 'leicht'"));
    assert!(!prompt.contains("Themenbereich"));
}

#[tokio::test]
async fn generator_reports_api_error() {
    let (base_url, _) = spawn_provider(StatusCode::TOO_MANY_REQUESTS, None).await;
    let generator = LlmQuestionGenerator::from_config(&config_for(&base_url)).unwrap();

    let err = generator
        .generate(&QuizCriteria::unconstrained())
        .await
        .unwrap_err();

    match err {
        GenerationError::Api(status, body) => {
            assert_eq!(status.as_u16(), 429);
            assert!(body.contains("rate limited"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn generator_rejects_prose_output() {
    let (base_url, _) = spawn_provider(StatusCode::OK, Some("Klar! Hier ist eine Frage ...")).await;
    let generator = LlmQuestionGenerator::from_config(&config_for(&base_url)).unwrap();

    let err = generator
        .generate(&QuizCriteria::unconstrained())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Malformed(_)));
}

#[tokio::test]
async fn generator_rejects_missing_content() {
    let (base_url, _) = spawn_provider(StatusCode::OK, None).await;
    let generator = LlmQuestionGenerator::from_config(&config_for(&base_url)).unwrap();

    let err = generator
        .generate(&QuizCriteria::unconstrained())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResponse));
}

#[tokio::test]
async fn generator_rejects_answer_outside_choices() {
    let output =
        r#"{"question": "Q", "choices": ["int", "float", "str", "bool"], "correct": "Float"}"#;
    let (base_url, _) = spawn_provider(StatusCode::OK, Some(output)).await;
    let generator = LlmQuestionGenerator::from_config(&config_for(&base_url)).unwrap();

    let err = generator
        .generate(&QuizCriteria::unconstrained())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Invalid(_)));
}

#[tokio::test]
async fn generator_reports_unreachable_provider() {
    // nothing listens on the discard port
    let generator = LlmQuestionGenerator::from_config(&config_for("http://127.0.0.1:9/v1")).unwrap();

    let err = generator
        .generate(&QuizCriteria::unconstrained())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Transport(_)));
}

#[tokio::test]
async fn start_with_constant_model_output_yields_one_question() {
    let (base_url, requests) = spawn_provider(StatusCode::OK, Some(VALID_OUTPUT)).await;
    let config = config_for(&base_url);
    let generator = LlmQuestionGenerator::from_config(&config).unwrap();

    let state = AppState {
        sessions: SessionStore::new(config.session_ttl_secs),
        config,
        generator: Arc::new(generator),
    };
    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let response = client
        .post(&format!("{}/start", address))
        .form(&[("difficulty", "alle"), ("topic", "alle")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["location"], "/quiz");

    // slot 1 accepts, slots 2 and 3 see only duplicates
    assert_eq!(requests.lock().unwrap().len(), 7);

    let page = client
        .get(&format!("{}/quiz", address))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Frage 1 von 1"));
}
