use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use chrono::Utc;
use crossbeam_channel::Sender;
use tokio::{
    task::JoinHandle,
    time::{Duration, Instant, sleep},
};
use tracing::{info, warn};

use crate::{
    config::OverlayConfig,
    events::{OverlayEvent, SequenceSource},
    jokes::{FALLBACK_JOKES, JokeSource, run_joke_supplier},
};

/// Seconds on the clock before the "still working" hint becomes visible.
const HINT_THRESHOLD_SECS: u64 = 10;

pub type ElapsedCallback = Box<dyn Fn(u64) + Send + Sync + 'static>;

/// Per-mount overlay settings, fixed for the lifetime of one mount.
/// Changing any of these means unmounting and mounting again.
#[derive(Debug, Clone)]
pub struct RotationConfig {
    pub message: String,
    pub show_content: bool,
    pub cycle_interval_ms: u64,
    pub show_timer: bool,
}

impl RotationConfig {
    pub fn from_config(config: &OverlayConfig) -> Self {
        Self {
            message: config.message.clone(),
            show_content: config.show_content,
            cycle_interval_ms: config.cycle_interval_ms.max(1),
            show_timer: config.show_timer,
        }
    }
}

/// Read-only view handed to the render surface.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySnapshot {
    pub message: String,
    pub current_text: Option<String>,
    pub elapsed_seconds: Option<u64>,
    pub show_hint: bool,
    pub active: bool,
}

struct RotationInner {
    sequence: Arc<Vec<String>>,
    source: SequenceSource,
    index: usize,
    current_text: String,
    elapsed_seconds: u64,
}

pub struct OverlayCore {
    message: String,
    show_content: bool,
    show_timer: bool,
    mounted: AtomicBool,
    started_at: Instant,
    inner: Mutex<RotationInner>,
}

impl OverlayCore {
    pub(crate) fn new(config: &RotationConfig) -> Self {
        let sequence: Arc<Vec<String>> =
            Arc::new(FALLBACK_JOKES.iter().map(|joke| (*joke).to_owned()).collect());
        let current_text = if config.show_content {
            sequence[0].clone()
        } else {
            String::new()
        };
        Self {
            message: config.message.clone(),
            show_content: config.show_content,
            show_timer: config.show_timer,
            mounted: AtomicBool::new(true),
            started_at: Instant::now(),
            inner: Mutex::new(RotationInner {
                sequence,
                source: SequenceSource::Fallback,
                index: 0,
                current_text,
                elapsed_seconds: 0,
            }),
        }
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    fn dismiss(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    /// One rotator tick. Reads whichever sequence is installed at tick time.
    pub(crate) fn advance_rotation(&self) -> Option<OverlayEvent> {
        if !self.is_mounted() {
            return None;
        }
        let mut inner = self.inner.lock().expect("overlay state lock poisoned");
        let sequence = Arc::clone(&inner.sequence);
        inner.index = (inner.index + 1) % sequence.len();
        inner.current_text = sequence[inner.index].clone();
        Some(OverlayEvent::ContentChanged {
            text: inner.current_text.clone(),
            index: inner.index,
            source: inner.source,
            at: Utc::now(),
        })
    }

    /// Swaps the fetched batch in as the active sequence. The index resets to
    /// the first element, which also clamps any index left over from a longer
    /// sequence. Discarded entirely once the overlay is unmounted.
    pub(crate) fn install_fetched(&self, jokes: Vec<String>) -> Vec<OverlayEvent> {
        if jokes.is_empty() || !self.is_mounted() {
            return Vec::new();
        }
        let sequence = Arc::new(jokes);
        let mut inner = self.inner.lock().expect("overlay state lock poisoned");
        inner.source = SequenceSource::Fetched;
        inner.index = 0;
        inner.current_text = sequence[0].clone();
        inner.sequence = Arc::clone(&sequence);
        info!(len = sequence.len(), "installed fetched joke sequence");
        vec![
            OverlayEvent::SequenceInstalled {
                source: SequenceSource::Fetched,
                len: sequence.len(),
                at: Utc::now(),
            },
            OverlayEvent::ContentChanged {
                text: inner.current_text.clone(),
                index: 0,
                source: SequenceSource::Fetched,
                at: Utc::now(),
            },
        ]
    }

    /// One elapsed-timer tick: whole seconds since mount.
    pub(crate) fn record_elapsed(&self) -> Option<u64> {
        if !self.is_mounted() {
            return None;
        }
        let seconds = self.started_at.elapsed().as_secs();
        let mut inner = self.inner.lock().expect("overlay state lock poisoned");
        inner.elapsed_seconds = seconds;
        Some(seconds)
    }

    pub fn snapshot(&self) -> OverlaySnapshot {
        let inner = self.inner.lock().expect("overlay state lock poisoned");
        OverlaySnapshot {
            message: self.message.clone(),
            current_text: self
                .show_content
                .then(|| inner.current_text.clone()),
            elapsed_seconds: self.show_timer.then_some(inner.elapsed_seconds),
            show_hint: self.show_timer && inner.elapsed_seconds > HINT_THRESHOLD_SECS,
            active: self.is_mounted(),
        }
    }
}

#[derive(Default)]
struct OverlayTasks {
    supplier: Option<JoinHandle<()>>,
    rotator: Option<JoinHandle<()>>,
    elapsed: Option<JoinHandle<()>>,
}

impl OverlayTasks {
    fn abort_all(&mut self) {
        abort_handle(&mut self.supplier);
        abort_handle(&mut self.rotator);
        abort_handle(&mut self.elapsed);
    }
}

fn abort_handle(handle: &mut Option<JoinHandle<()>>) {
    if let Some(task) = handle.take() {
        task.abort();
    }
}

pub struct OverlayHandle {
    core: Arc<OverlayCore>,
    tasks: OverlayTasks,
}

impl OverlayHandle {
    pub fn snapshot(&self) -> OverlaySnapshot {
        self.core.snapshot()
    }

    /// Tears the overlay down: no event is published and no state mutated
    /// after this returns. Safe to call more than once.
    pub fn unmount(&mut self) {
        self.core.dismiss();
        self.tasks.abort_all();
    }
}

impl Drop for OverlayHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}

pub fn mount_overlay<S>(
    config: RotationConfig,
    source: S,
    tx: Sender<OverlayEvent>,
    on_elapsed: Option<ElapsedCallback>,
) -> OverlayHandle
where
    S: JokeSource + Send + 'static,
{
    let core = Arc::new(OverlayCore::new(&config));
    let mut tasks = OverlayTasks::default();

    if config.show_content {
        tasks.supplier = Some(tokio::spawn(run_joke_supplier(
            Arc::clone(&core),
            source,
            tx.clone(),
        )));
        let period = Duration::from_millis(config.cycle_interval_ms.max(1));
        tasks.rotator = Some(tokio::spawn(run_rotator(
            Arc::clone(&core),
            period,
            tx.clone(),
        )));
    }
    if config.show_timer {
        tasks.elapsed = Some(tokio::spawn(run_elapsed_timer(
            Arc::clone(&core),
            tx,
            on_elapsed,
        )));
    }

    OverlayHandle { core, tasks }
}

async fn run_rotator(core: Arc<OverlayCore>, period: Duration, tx: Sender<OverlayEvent>) {
    loop {
        sleep(period).await;
        let Some(event) = core.advance_rotation() else {
            return;
        };
        if tx.send(event).is_err() {
            warn!("overlay receiver dropped; stopping rotator");
            return;
        }
    }
}

async fn run_elapsed_timer(
    core: Arc<OverlayCore>,
    tx: Sender<OverlayEvent>,
    on_elapsed: Option<ElapsedCallback>,
) {
    loop {
        sleep(Duration::from_secs(1)).await;
        let Some(seconds) = core.record_elapsed() else {
            return;
        };
        if let Some(callback) = on_elapsed.as_ref() {
            callback(seconds);
        }
        let event = OverlayEvent::ElapsedTick {
            seconds,
            at: Utc::now(),
        };
        if tx.send(event).is_err() {
            warn!("overlay receiver dropped; stopping elapsed timer");
            return;
        }
    }
}

/// `MM:SS`, both fields zero-padded. Minutes keep growing past 59.
pub fn format_elapsed(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}
