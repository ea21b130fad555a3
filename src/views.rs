// src/views.rs

//! Server-rendered pages. Every interpolation goes through maud's escaping,
//! which matters because question text comes straight from the model.

use axum::response::Html;
use maud::{DOCTYPE, Markup, html};

use crate::models::{
    question::{ANY_LABEL, Question},
    session::{ChatMessage, QuizResults},
};

pub const DIFFICULTIES: [&str; 3] = ["leicht", "mittel", "schwer"];

pub const TOPICS: [&str; 4] = [
    "Grundlagen und Datentypen",
    "Kontrollfluss und Schleifen",
    "Datensammlungen",
    "Funktionen und Ausnahmen",
];

fn layout(title: &str, flash: Option<&str>, content: Markup) -> Html<String> {
    let page = html! {
        (DOCTYPE)
        html lang="de" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
            }
            body {
                main {
                    @if let Some(message) = flash {
                        p class="flash" role="alert" { (message) }
                    }
                    (content)
                }
            }
        }
    };
    Html(page.into_string())
}

pub fn index(exam: &str, flash: Option<&str>) -> Html<String> {
    layout(
        &format!("{} Trainer", exam),
        flash,
        html! {
            h1 { (exam) " Trainer" }
            form method="post" action="/start" {
                label for="difficulty" { "Schwierigkeitsgrad" }
                select id="difficulty" name="difficulty" {
                    option value=(ANY_LABEL) { "alle" }
                    @for difficulty in DIFFICULTIES {
                        option value=(difficulty) { (difficulty) }
                    }
                }
                label for="topic" { "Themenbereich" }
                select id="topic" name="topic" {
                    option value=(ANY_LABEL) { "alle" }
                    @for topic in TOPICS {
                        option value=(topic) { (topic) }
                    }
                }
                label {
                    input type="checkbox" name="godmode";
                    " God Mode"
                }
                button type="submit" { "Quiz starten" }
            }
        },
    )
}

pub fn quiz(question: &Question, position: usize, total: usize, score: usize) -> Html<String> {
    layout(
        &format!("Frage {} von {}", position, total),
        None,
        html! {
            p class="progress" { "Frage " (position) " von " (total) " · Punkte: " (score) }
            h2 { (question.text) }
            form method="post" action="/submit_answer" {
                @for (i, choice) in question.choices.iter().enumerate() {
                    div {
                        input type="radio" id=(format!("choice-{}", i)) name="answer" value=(choice) required;
                        label for=(format!("choice-{}", i)) { (choice) }
                    }
                }
                button type="submit" { "Antworten" }
            }
            a href="/chat" { "Pause" }
        },
    )
}

pub fn results(results: &QuizResults<'_>) -> Html<String> {
    layout(
        "Ergebnis",
        None,
        html! {
            h1 { "Ergebnis" }
            p class="score" { (results.score) " / " (results.total) }
            ol {
                @for (index, answer) in &results.answers {
                    li class=(if answer.is_correct { "correct" } else { "wrong" }) {
                        h3 { (index + 1) ". " (answer.question_text) }
                        ul {
                            @for choice in &answer.choices {
                                li {
                                    (choice)
                                    @if *choice == answer.correct_choice { " ✔" }
                                    @if answer.selected_choice.as_deref() == Some(choice.as_str()) {
                                        " (deine Antwort)"
                                    }
                                }
                            }
                        }
                        @if answer.selected_choice.is_none() {
                            p { "Keine Antwort gewählt." }
                        }
                    }
                }
            }
            a href="/" { "Neues Quiz" }
        },
    )
}

pub fn chat(log: &[ChatMessage], quiz_paused: bool) -> Html<String> {
    layout(
        "Chat",
        None,
        html! {
            h1 { "Chat" }
            ul class="chat" {
                @for message in log {
                    li {
                        time datetime=(message.sent_at.to_rfc3339()) { (message.sent_at.format("%H:%M")) }
                        " "
                        strong { (message.sender) ": " }
                        (message.text)
                    }
                }
            }
            form method="post" action="/chat_message" {
                input type="text" name="message" autocomplete="off";
                button type="submit" { "Senden" }
            }
            @if quiz_paused {
                form method="post" action="/resume_quiz" {
                    button type="submit" { "Quiz fortsetzen" }
                }
            }
        },
    )
}
