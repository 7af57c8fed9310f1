use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::info;

/// Placeholder question endpoint: a fixed JSON document, no storage and no
/// generation. The real question pipeline lives elsewhere.
pub async fn run_question_stub(bind: &str) -> Result<()> {
    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/questions", get(|| async { Json(canned_questions()) }));

    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid api bind address: {bind}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed binding api listener on {addr}"))?;

    info!("question stub listening on http://{addr}/api/questions");
    axum::serve(listener, app)
        .await
        .context("axum serve failed")?;
    Ok(())
}

fn canned_questions() -> Value {
    json!({
        "role": "general",
        "questions": [
            {
                "id": 1,
                "category": "behavioral",
                "prompt": "Tell me about a time you disagreed with a teammate. How did you resolve it?"
            },
            {
                "id": 2,
                "category": "behavioral",
                "prompt": "Describe a project you shipped under a tight deadline. What did you cut?"
            },
            {
                "id": 3,
                "category": "technical",
                "prompt": "Walk me through what happens when you type a URL into a browser."
            },
            {
                "id": 4,
                "category": "technical",
                "prompt": "How would you design a rate limiter for a public API?"
            },
            {
                "id": 5,
                "category": "reflective",
                "prompt": "What is a piece of feedback that changed how you work?"
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::canned_questions;
    use serde_json::Value;

    #[test]
    fn canned_payload_has_prompts_for_every_question() {
        let payload = canned_questions();
        let questions = payload["questions"]
            .as_array()
            .expect("questions should be an array");
        assert_eq!(questions.len(), 5);
        for question in questions {
            let prompt = question["prompt"].as_str().expect("prompt should be text");
            assert!(!prompt.is_empty());
            assert!(matches!(question["id"], Value::Number(_)));
        }
    }
}
