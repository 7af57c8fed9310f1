use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceSource {
    Fallback,
    Fetched,
}

impl SequenceSource {
    pub fn label(self) -> &'static str {
        match self {
            SequenceSource::Fallback => "fallback",
            SequenceSource::Fetched => "fetched",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverlayEvent {
    ContentChanged {
        text: String,
        index: usize,
        source: SequenceSource,
        at: DateTime<Utc>,
    },
    SequenceInstalled {
        source: SequenceSource,
        len: usize,
        at: DateTime<Utc>,
    },
    ElapsedTick {
        seconds: u64,
        at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub struct StatusItem {
    pub label: String,
    pub at: DateTime<Utc>,
}

impl StatusItem {
    pub fn from_event(event: &OverlayEvent) -> Self {
        match event {
            OverlayEvent::ContentChanged {
                text,
                index,
                source,
                at,
            } => Self {
                label: format!("JOKE [{}:{index}] {text}", source.label()),
                at: *at,
            },
            OverlayEvent::SequenceInstalled { source, len, at } => Self {
                label: format!("SEQUENCE {} ({len} items)", source.label()),
                at: *at,
            },
            OverlayEvent::ElapsedTick { seconds, at } => Self {
                label: format!("TIMER {seconds}s"),
                at: *at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OverlayEvent, SequenceSource, StatusItem};
    use chrono::Utc;

    #[test]
    fn content_changed_serializes_with_snake_case_tag() {
        let event = OverlayEvent::ContentChanged {
            text: "Why do programmers prefer dark mode?".to_owned(),
            index: 2,
            source: SequenceSource::Fetched,
            at: Utc::now(),
        };
        let raw = serde_json::to_string(&event).expect("serialize");
        assert!(raw.contains(r#""type":"content_changed""#));
        assert!(raw.contains(r#""source":"fetched""#));
    }

    #[test]
    fn elapsed_tick_roundtrips() {
        let raw = r#"{"type":"elapsed_tick","seconds":42,"at":"2026-02-18T00:00:00Z"}"#;
        let parsed: OverlayEvent = serde_json::from_str(raw).expect("deserialize");
        match parsed {
            OverlayEvent::ElapsedTick { seconds, .. } => assert_eq!(seconds, 42),
            other => panic!("expected elapsed tick, got {other:?}"),
        }
    }

    #[test]
    fn status_labels_name_the_active_source() {
        let installed = OverlayEvent::SequenceInstalled {
            source: SequenceSource::Fallback,
            len: 8,
            at: Utc::now(),
        };
        assert_eq!(
            StatusItem::from_event(&installed).label,
            "SEQUENCE fallback (8 items)"
        );

        let tick = OverlayEvent::ElapsedTick {
            seconds: 7,
            at: Utc::now(),
        };
        assert_eq!(StatusItem::from_event(&tick).label, "TIMER 7s");
    }
}
