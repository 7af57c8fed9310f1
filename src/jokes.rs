use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{events::OverlayEvent, overlay::OverlayCore};

/// Shown from the moment the overlay mounts until a fetched batch replaces it.
pub const FALLBACK_JOKES: [&str; 8] = [
    "Why do programmers prefer dark mode? Because light attracts bugs.",
    "Why was the function sad after the interview? It didn't get called back.",
    "A SQL query walks into a bar, approaches two tables and asks: may I join you?",
    "There are only 10 kinds of people: those who understand binary and those who don't.",
    "Why did the developer go broke? They used up all their cache.",
    "How many programmers does it take to change a light bulb? None, that's a hardware problem.",
    "Debugging: being the detective in a crime movie where you are also the murderer.",
    "I'd tell you a UDP joke, but you might not get it.",
];

pub(crate) const MAX_FETCH_ATTEMPTS: usize = 5;
pub(crate) const FETCH_GAP: Duration = Duration::from_millis(100);

/// One no-argument call against the remote joke service: a display string or
/// an opaque error. The overlay never inspects the error beyond logging it.
pub trait JokeSource {
    fn fetch_one(&self) -> impl Future<Output = Result<String>> + Send;
}

pub struct HttpJokeSource {
    client: reqwest::Client,
    url: String,
}

impl HttpJokeSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(4))
            .build()
            .context("failed building joke http client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl JokeSource for HttpJokeSource {
    async fn fetch_one(&self) -> Result<String> {
        let root = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("joke request to {} failed", self.url))?
            .error_for_status()
            .context("joke service returned an error status")?
            .json::<Value>()
            .await
            .context("joke payload was not valid json")?;
        extract_joke_text(&root).context("joke payload had no usable text field")
    }
}

/// Accepts the two payload shapes seen in the wild: a single `joke` field, or
/// a `setup`/`punchline` pair.
fn extract_joke_text(root: &Value) -> Option<String> {
    if let Some(joke) = root.get("joke").and_then(Value::as_str) {
        let joke = joke.trim();
        if !joke.is_empty() {
            return Some(joke.to_owned());
        }
    }
    let setup = root.get("setup").and_then(Value::as_str)?.trim();
    let punchline = root.get("punchline").and_then(Value::as_str)?.trim();
    if setup.is_empty() || punchline.is_empty() {
        return None;
    }
    Some(format!("{setup} {punchline}"))
}

pub(crate) async fn run_joke_supplier<S>(
    core: Arc<OverlayCore>,
    source: S,
    tx: Sender<OverlayEvent>,
) where
    S: JokeSource + Send + 'static,
{
    let mut fetched: Vec<String> = Vec::new();
    for attempt in 1..=MAX_FETCH_ATTEMPTS {
        if !core.is_mounted() {
            return;
        }
        match source.fetch_one().await {
            Ok(text) => {
                let text = text.trim().to_owned();
                debug!(attempt, "fetched joke");
                if !text.is_empty() {
                    fetched.push(text);
                }
            }
            Err(err) => {
                info!(?err, attempt, "joke fetch failed; keeping current rotation");
                break;
            }
        }
        if attempt < MAX_FETCH_ATTEMPTS {
            sleep(FETCH_GAP).await;
        }
    }

    if fetched.is_empty() {
        info!("no jokes fetched; fallback rotation stays active");
        return;
    }

    for event in core.install_fetched(fetched) {
        if tx.send(event).is_err() {
            warn!("overlay receiver dropped; stopping joke supplier");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FALLBACK_JOKES, extract_joke_text};
    use serde_json::json;

    #[test]
    fn fallback_list_has_eight_non_empty_entries() {
        assert_eq!(FALLBACK_JOKES.len(), 8);
        assert!(FALLBACK_JOKES.iter().all(|joke| !joke.trim().is_empty()));
    }

    #[test]
    fn extracts_single_joke_field() {
        let payload = json!({ "id": "abc", "joke": "  I'd tell you a UDP joke...  " });
        assert_eq!(
            extract_joke_text(&payload).as_deref(),
            Some("I'd tell you a UDP joke...")
        );
    }

    #[test]
    fn extracts_setup_punchline_pair() {
        let payload = json!({
            "setup": "Why do Java developers wear glasses?",
            "punchline": "Because they don't C#."
        });
        assert_eq!(
            extract_joke_text(&payload).as_deref(),
            Some("Why do Java developers wear glasses? Because they don't C#.")
        );
    }

    #[test]
    fn rejects_payloads_without_text() {
        assert!(extract_joke_text(&json!({ "id": "abc" })).is_none());
        assert!(extract_joke_text(&json!({ "joke": "   " })).is_none());
        assert!(extract_joke_text(&json!({ "setup": "half a joke" })).is_none());
    }
}
