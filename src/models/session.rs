// src/models/session.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::question::Question;

/// Chat messages kept per session; older ones are dropped first.
pub const MAX_CHAT_MESSAGES: usize = 50;

/// What a user answered for one question. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    pub question_text: String,
    pub choices: Vec<String>,
    pub selected_choice: Option<String>,
    pub correct_choice: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub sender: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    NotStarted,
    InProgress,
    Paused,
    Completed,
}

/// Where the caller should go after an answer was handed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Answer stored; the quiz moved on to the next index.
    Recorded { is_correct: bool },
    /// No active question. Nothing was changed.
    NoActiveQuestion,
    /// Quiz is paused. Nothing was changed.
    Paused,
}

/// What `/quiz` should show.
#[derive(Debug, PartialEq, Eq)]
pub enum CurrentView<'a> {
    Question {
        question: &'a Question,
        /// 1-based position for display.
        position: usize,
        total: usize,
        score: usize,
    },
    Paused,
    /// Exhausted (or never started): show the results instead.
    Finished,
}

#[derive(Debug, Serialize)]
pub struct QuizResults<'a> {
    pub answers: Vec<(usize, &'a AnswerRecord)>,
    pub score: usize,
    pub total: usize,
}

/// Per-user quiz state, owned by exactly one session.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    questions: Vec<Question>,
    answers: BTreeMap<usize, AnswerRecord>,
    current_index: usize,
    score: usize,
    started: bool,
    paused: bool,
    chat_log: Vec<ChatMessage>,
    flash: Option<String>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever quiz was stored with a fresh one.
    pub fn start(&mut self, questions: Vec<Question>) {
        self.questions = questions;
        self.answers.clear();
        self.current_index = 0;
        self.score = 0;
        self.started = true;
        self.paused = false;
        self.chat_log.clear();
    }

    pub fn phase(&self) -> QuizPhase {
        if !self.started {
            QuizPhase::NotStarted
        } else if self.current_index >= self.questions.len() {
            QuizPhase::Completed
        } else if self.paused {
            QuizPhase::Paused
        } else {
            QuizPhase::InProgress
        }
    }

    /// Records `selected` against the current question and advances.
    ///
    /// Comparison is exact string equality; no trimming or case folding.
    pub fn submit_answer(&mut self, selected: Option<String>) -> SubmitOutcome {
        match self.phase() {
            QuizPhase::InProgress => {}
            QuizPhase::Paused => return SubmitOutcome::Paused,
            QuizPhase::NotStarted | QuizPhase::Completed => {
                return SubmitOutcome::NoActiveQuestion;
            }
        }

        let index = self.current_index;
        let question = &self.questions[index];
        let is_correct = question.is_correct(selected.as_deref());

        self.answers.insert(
            index,
            AnswerRecord {
                question_text: question.text.clone(),
                choices: question.choices.clone(),
                selected_choice: selected,
                correct_choice: question.correct_choice.clone(),
                is_correct,
            },
        );

        if is_correct {
            self.score += 1;
        }
        self.current_index += 1;

        SubmitOutcome::Recorded { is_correct }
    }

    pub fn view_current(&self) -> CurrentView<'_> {
        match self.phase() {
            QuizPhase::InProgress => CurrentView::Question {
                question: &self.questions[self.current_index],
                position: self.current_index + 1,
                total: self.questions.len(),
                score: self.score,
            },
            QuizPhase::Paused => CurrentView::Paused,
            QuizPhase::NotStarted | QuizPhase::Completed => CurrentView::Finished,
        }
    }

    /// Reflects whatever is stored, in any phase.
    pub fn view_results(&self) -> QuizResults<'_> {
        QuizResults {
            answers: self.answers.iter().map(|(i, a)| (*i, a)).collect(),
            score: self.score,
            total: self.questions.len(),
        }
    }

    /// Returns false when there is no running quiz to pause.
    pub fn pause(&mut self) -> bool {
        if self.phase() == QuizPhase::InProgress {
            self.paused = true;
            true
        } else {
            false
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn push_chat(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.chat_log.push(ChatMessage {
            sender: "User".to_string(),
            text: text.to_string(),
            sent_at: Utc::now(),
        });
        if self.chat_log.len() > MAX_CHAT_MESSAGES {
            let overflow = self.chat_log.len() - MAX_CHAT_MESSAGES;
            self.chat_log.drain(..overflow);
        }
    }

    pub fn chat_log(&self) -> &[ChatMessage] {
        &self.chat_log
    }

    pub fn set_flash(&mut self, message: impl Into<String>) {
        self.flash = Some(message.into());
    }

    pub fn take_flash(&mut self) -> Option<String> {
        self.flash.take()
    }

    pub fn answers(&self) -> &BTreeMap<usize, AnswerRecord> {
        &self.answers
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }
}
