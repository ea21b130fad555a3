// src/services/assembly.rs

use std::collections::HashSet;

use crate::{
    config::{Config, DEFAULT_MAX_ATTEMPTS_PER_SLOT, DEFAULT_QUESTION_COUNT},
    models::question::{Question, QuizCriteria},
    services::generator::QuestionSource,
};

/// How many questions to aim for and how hard to try per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyPlan {
    pub desired_count: usize,
    pub max_attempts_per_slot: usize,
}

impl Default for AssemblyPlan {
    fn default() -> Self {
        Self {
            desired_count: DEFAULT_QUESTION_COUNT,
            max_attempts_per_slot: DEFAULT_MAX_ATTEMPTS_PER_SLOT,
        }
    }
}

impl From<&Config> for AssemblyPlan {
    fn from(config: &Config) -> Self {
        Self {
            desired_count: config.question_count,
            max_attempts_per_slot: config.max_attempts_per_slot,
        }
    }
}

/// Fills up to `plan.desired_count` slots with unique questions.
///
/// Calls run strictly one after another. A slot whose attempts all fail or
/// only produce duplicates is dropped, so the result may be shorter than
/// requested, or empty.
pub async fn assemble_quiz(
    source: &dyn QuestionSource,
    criteria: &QuizCriteria,
    plan: AssemblyPlan,
) -> Vec<Question> {
    let mut questions: Vec<Question> = Vec::with_capacity(plan.desired_count);
    let mut seen: HashSet<String> = HashSet::new();

    for slot in 0..plan.desired_count {
        for attempt in 1..=plan.max_attempts_per_slot {
            match source.generate(criteria).await {
                Ok(question) => {
                    // exact match on trimmed text only
                    if seen.insert(question.dedup_key().to_string()) {
                        questions.push(question);
                        break;
                    }
                    tracing::debug!(
                        "Slot {} attempt {}: duplicate question discarded",
                        slot + 1,
                        attempt
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Slot {} attempt {}: failed to generate question: {}",
                        slot + 1,
                        attempt,
                        e
                    );
                }
            }
        }
    }

    tracing::info!(
        "Assembled {} of {} questions (difficulty: {}, topic: {})",
        questions.len(),
        plan.desired_count,
        criteria.difficulty.label(),
        criteria.topic.label()
    );

    questions
}
