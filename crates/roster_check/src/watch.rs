//! Watch mode: re-run validation whenever records, the registry, or the schema source change.
//!
//! Each watched path is polled on its own thread. A poll compares a snapshot of file identities
//! (length and modification time) against the previous one and emits a [`WatchEvent`] when they
//! differ. The [`WatchController`] owns every [`WatchHandle`] and releases them on shutdown.
//!
//! At most one pass is active. A new request cancels the in-flight pass through its
//! [`CancelToken`] and bumps a generation counter; a pass may only print while its generation is
//! current, so a superseded pass can never publish after a newer request.

use crate::loader::is_record_file;
use crate::report::ReportSink;
use crate::runner::{run_pass, PassOutcome};
use crate::runtime::cancel::CancelToken;
use crate::runtime::error::{CheckError, CheckResult};
use crate::settings::Settings;
use roster_contract::PassReport;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, UNIX_EPOCH};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

const RUNNING_STATUS: &str = "🔄 Validating contributor files...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FileIdentity {
    len: u64,
    modified_nanos: u128,
}

impl FileIdentity {
    fn for_path(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        if !meta.is_file() {
            return None;
        }
        let modified_nanos = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Some(Self {
            len: meta.len(),
            modified_nanos,
        })
    }
}

type Snapshot = BTreeMap<PathBuf, FileIdentity>;

/// What a watch observes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchTarget {
    /// Record files with recognized extensions directly inside a directory.
    RecordDir(PathBuf),
    /// A single definition file.
    File(PathBuf),
}

impl WatchTarget {
    pub fn path(&self) -> &Path {
        match self {
            Self::RecordDir(path) | Self::File(path) => path,
        }
    }

    fn snapshot(&self) -> Snapshot {
        match self {
            Self::File(path) => FileIdentity::for_path(path)
                .map(|id| Snapshot::from([(path.clone(), id)]))
                .unwrap_or_default(),
            Self::RecordDir(dir) => {
                let Ok(entries) = fs::read_dir(dir) else {
                    return Snapshot::new();
                };
                entries
                    .flatten()
                    .map(|entry| entry.path())
                    .filter(|path| is_record_file(path))
                    .filter_map(|path| FileIdentity::for_path(&path).map(|id| (path, id)))
                    .collect()
            }
        }
    }
}

/// A change observed on a watched path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchEvent {
    pub target: WatchTarget,
}

/// An active poll-based watch. Dropping the handle signals the poll thread to stop at its next
/// tick without waiting for it; [`WatchHandle::release`] also joins the thread.
#[derive(Debug)]
pub struct WatchHandle {
    target: WatchTarget,
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl WatchHandle {
    /// Start polling `target` every `interval`, sending an event on each observed change.
    pub fn start(
        target: WatchTarget,
        interval: Duration,
        events: UnboundedSender<WatchEvent>,
    ) -> CheckResult<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let thread_target = target.clone();
        let thread = thread::Builder::new()
            .name("roster-watch".into())
            .spawn(move || poll_loop(thread_target, interval, thread_stop, events))
            .map_err(|err| {
                CheckError::io(format!("failed to start watcher: {err}"))
                    .with_operation("watch")
                    .with_path(target.path())
            })?;
        tracing::debug!(path = %target.path().display(), "watch registered");
        Ok(Self {
            target,
            stop,
            thread: Some(thread),
        })
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    /// Stop polling and wait for the poll thread to exit.
    pub fn release(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        tracing::debug!(path = %self.target.path().display(), "watch released");
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

fn poll_loop(
    target: WatchTarget,
    interval: Duration,
    stop: Arc<AtomicBool>,
    events: UnboundedSender<WatchEvent>,
) {
    let mut baseline = target.snapshot();
    loop {
        thread::sleep(interval);
        if stop.load(Ordering::SeqCst) {
            break;
        }
        let current = target.snapshot();
        if current == baseline {
            continue;
        }
        baseline = current;
        let event = WatchEvent {
            target: target.clone(),
        };
        if events.send(event).is_err() {
            break;
        }
    }
}

/// Paths whose changes trigger a new pass.
pub fn watch_targets(settings: &Settings) -> Vec<WatchTarget> {
    let mut targets = vec![
        WatchTarget::RecordDir(settings.records_dir.clone()),
        WatchTarget::File(settings.registry_path.clone()),
    ];
    if let Some(schema) = &settings.schema_source {
        targets.push(WatchTarget::File(schema.clone()));
    }
    targets
}

/// Gate between passes and the sink. Only the current generation may write.
struct Publisher {
    sink: Arc<dyn ReportSink>,
    current: Mutex<u64>,
}

impl Publisher {
    fn advance(&self) -> u64 {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += 1;
        *current
    }

    fn status(&self, generation: u64, message: &str) {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == generation {
            self.sink.status(message);
        }
    }

    fn publish(&self, generation: u64, token: &CancelToken, report: &PassReport) -> bool {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != generation || token.is_cancelled() {
            return false;
        }
        self.sink.publish(report);
        true
    }
}

enum WatchState {
    Idle,
    Running {
        token: CancelToken,
        task: JoinHandle<()>,
    },
}

/// Owns the watches and the single in-flight pass.
pub struct WatchController {
    settings: Arc<Settings>,
    publisher: Arc<Publisher>,
    state: WatchState,
    watches: Vec<WatchHandle>,
}

impl WatchController {
    pub fn new(settings: Settings, sink: Arc<dyn ReportSink>) -> Self {
        Self {
            settings: Arc::new(settings),
            publisher: Arc::new(Publisher {
                sink,
                current: Mutex::new(0),
            }),
            state: WatchState::Idle,
            watches: Vec::new(),
        }
    }

    /// Whether a pass is still in flight.
    pub fn is_running(&self) -> bool {
        match &self.state {
            WatchState::Idle => false,
            WatchState::Running { task, .. } => !task.is_finished(),
        }
    }

    /// Start a new pass, cancelling the in-flight one first.
    pub fn request_pass(&mut self) {
        if let WatchState::Running { token, .. } = &self.state {
            token.cancel();
            tracing::debug!("cancelled in-flight validation pass");
        }

        let generation = self.publisher.advance();
        let token = CancelToken::new();
        let settings = Arc::clone(&self.settings);
        let publisher = Arc::clone(&self.publisher);
        let pass_token = token.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(settings.pacing_delay).await;
            if pass_token.is_cancelled() {
                return;
            }
            publisher.status(generation, RUNNING_STATUS);
            if let PassOutcome::Completed(report) = run_pass(&settings, &pass_token).await {
                if !publisher.publish(generation, &pass_token, &report) {
                    tracing::debug!(generation, "discarded superseded report");
                }
            }
        });
        self.state = WatchState::Running { token, task };
    }

    /// Wait for the in-flight pass, if any, and return to idle.
    pub async fn wait_idle(&mut self) {
        let state = std::mem::replace(&mut self.state, WatchState::Idle);
        if let WatchState::Running { task, .. } = state {
            if let Err(err) = task.await {
                tracing::error!(error = %err, "validation pass task failed");
            }
        }
    }

    /// Register a watch for every target, sending events to `events`.
    pub fn start_watches(&mut self, events: &UnboundedSender<WatchEvent>) -> CheckResult<()> {
        for target in watch_targets(&self.settings) {
            let handle = WatchHandle::start(target, self.settings.poll_interval, events.clone())?;
            self.watches.push(handle);
        }
        Ok(())
    }

    /// Paths currently watched.
    pub fn watched(&self) -> Vec<&WatchTarget> {
        self.watches.iter().map(WatchHandle::target).collect()
    }

    /// Cancel any in-flight pass and release every watch.
    pub fn shutdown(&mut self) {
        if let WatchState::Running { token, task } =
            std::mem::replace(&mut self.state, WatchState::Idle)
        {
            token.cancel();
            task.abort();
        }
        for handle in self.watches.drain(..) {
            handle.release();
        }
    }

    /// Run until interrupted: one eager pass, then a new pass per batch of change events.
    pub async fn run(mut self) -> CheckResult<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.start_watches(&tx)?;
        drop(tx);
        self.request_pass();

        let shutdown = wait_for_shutdown_signal();
        tokio::pin!(shutdown);
        let result = loop {
            tokio::select! {
                signal = &mut shutdown => break signal,
                event = rx.recv() => {
                    let Some(event) = event else {
                        break Ok(());
                    };
                    tracing::debug!(path = %event.target.path().display(), "change detected");
                    drain_pending(&mut rx);
                    self.request_pass();
                }
            }
        };

        self.shutdown();
        result
    }
}

impl Drop for WatchController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn drain_pending(rx: &mut UnboundedReceiver<WatchEvent>) {
    while rx.try_recv().is_ok() {}
}

async fn wait_for_shutdown_signal() -> CheckResult<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let register = |kind: SignalKind, name: &str| {
            signal(kind).map_err(|err| {
                CheckError::environment(format!("failed to register {name} handler: {err}"))
            })
        };
        let mut sigterm = register(SignalKind::terminate(), "SIGTERM")?;
        let mut sigint = register(SignalKind::interrupt(), "SIGINT")?;
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
        Ok(())
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .map_err(|err| CheckError::environment(format!("failed to await Ctrl-C: {err}")))
    }
}
