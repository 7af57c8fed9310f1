mod config;
mod events;
mod jokes;
mod overlay;
mod server;

use anyhow::Result;
use crossbeam_channel::Receiver;
use tokio::time::{Duration, sleep};
use tracing::{debug, error, info};

use crate::{
    config::OverlayConfig,
    events::{OverlayEvent, StatusItem},
    jokes::HttpJokeSource,
    overlay::{OverlayHandle, OverlaySnapshot, RotationConfig, format_elapsed, mount_overlay},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (config, config_path) = OverlayConfig::load_or_create()?;
    info!(path = %config_path.display(), "loaded overlay config");

    let (tx, rx) = crossbeam_channel::unbounded::<OverlayEvent>();

    if config.api_enabled {
        let bind = config.api_bind.clone();
        tokio::spawn(async move {
            if let Err(err) = server::run_question_stub(&bind).await {
                error!(?err, bind = %bind, "question stub crashed");
            }
        });
    } else {
        info!("question stub disabled (api_enabled=false)");
    }

    let source = HttpJokeSource::new(config.joke_source_url.clone())?;
    let mut handle = mount_overlay(
        RotationConfig::from_config(&config),
        source,
        tx,
        Some(Box::new(|seconds| debug!(seconds, "elapsed timer tick"))),
    );

    run_render_surface(&handle, rx).await;
    handle.unmount();
    info!("overlay unmounted");
    Ok(())
}

/// Minimal terminal stand-in for the real render surface: drains overlay
/// events and reprints the status line whenever it changes, until Ctrl-C.
async fn run_render_surface(handle: &OverlayHandle, rx: Receiver<OverlayEvent>) {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut last_line = String::new();
    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(err) = result {
                    error!(?err, "failed listening for ctrl-c");
                }
                info!("shutting down overlay");
                return;
            }
            _ = sleep(Duration::from_millis(250)) => {
                for event in rx.try_iter() {
                    debug!(label = %StatusItem::from_event(&event).label, "overlay event");
                }
                let line = render_status_line(&handle.snapshot());
                if line != last_line {
                    println!("{line}");
                    last_line = line;
                }
            }
        }
    }
}

fn render_status_line(snapshot: &OverlaySnapshot) -> String {
    let mut line = snapshot.message.clone();
    if let Some(seconds) = snapshot.elapsed_seconds {
        line.push_str(&format!(" [{}]", format_elapsed(seconds)));
    }
    if let Some(text) = snapshot.current_text.as_deref() {
        line.push_str(" | ");
        line.push_str(text);
    }
    if snapshot.show_hint {
        line.push_str(" (still working, hang tight)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::render_status_line;
    use crate::overlay::OverlaySnapshot;

    #[test]
    fn status_line_includes_timer_and_content() {
        let snapshot = OverlaySnapshot {
            message: "Generating interview questions...".to_owned(),
            current_text: Some("I'd tell you a UDP joke, but you might not get it.".to_owned()),
            elapsed_seconds: Some(75),
            show_hint: false,
            active: true,
        };
        assert_eq!(
            render_status_line(&snapshot),
            "Generating interview questions... [01:15] | I'd tell you a UDP joke, but you might not get it."
        );
    }

    #[test]
    fn status_line_omits_disabled_parts_and_shows_hint() {
        let snapshot = OverlaySnapshot {
            message: "Generating interview questions...".to_owned(),
            current_text: None,
            elapsed_seconds: Some(11),
            show_hint: true,
            active: true,
        };
        assert_eq!(
            render_status_line(&snapshot),
            "Generating interview questions... [00:11] (still working, hang tight)"
        );
    }
}
