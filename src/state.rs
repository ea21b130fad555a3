use std::sync::Arc;

use crate::config::Config;
use crate::services::{generator::QuestionSource, session_store::SessionStore};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub generator: Arc<dyn QuestionSource>,
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<dyn QuestionSource> {
    fn from_ref(state: &AppState) -> Self {
        state.generator.clone()
    }
}
