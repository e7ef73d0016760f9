//! Background fetcher that runs the usage script and caches the last good reading.

use std::sync::Arc;

use chrono::Local;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::parser::{parse_usage_output, validate, Validity};
use super::runner::{ProcessRunner, RunError, ScriptRunner};
use super::types::{FetchSnapshot, FetchState};

/// Callback receiving a snapshot after every state change
pub type UpdateListener = Arc<dyn Fn(&FetchSnapshot) + Send + Sync>;

/// Strategy for delivering listener callbacks, e.g. onto a UI-owning thread
pub trait Dispatcher: Send + Sync {
    /// Hand the snapshot to the listener
    fn deliver(&self, listener: UpdateListener, snapshot: FetchSnapshot);
}

/// Calls the listener on the fetch task itself
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectDispatcher;

impl Dispatcher for DirectDispatcher {
    fn deliver(&self, listener: UpdateListener, snapshot: FetchSnapshot) {
        listener(&snapshot);
    }
}

/// A pending listener invocation forwarded by [`ChannelDispatcher`]
pub struct Delivery {
    listener: UpdateListener,
    snapshot: FetchSnapshot,
}

impl Delivery {
    /// Invoke the listener on the current thread
    pub fn run(self) {
        (self.listener)(&self.snapshot);
    }

    /// Snapshot carried by this delivery
    pub fn snapshot(&self) -> &FetchSnapshot {
        &self.snapshot
    }
}

/// Receiving side of a [`ChannelDispatcher`]
pub type DeliveryReceiver = mpsc::UnboundedReceiver<Delivery>;

/// Forwards deliveries to whichever loop drains the paired receiver
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    tx: mpsc::UnboundedSender<Delivery>,
}

impl ChannelDispatcher {
    /// Create a dispatcher and the receiver the UI loop drains
    pub fn channel() -> (Self, DeliveryReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Dispatcher for ChannelDispatcher {
    fn deliver(&self, listener: UpdateListener, snapshot: FetchSnapshot) {
        if self.tx.send(Delivery { listener, snapshot }).is_err() {
            debug!("Usage update dropped: UI loop has stopped");
        }
    }
}

impl std::fmt::Debug for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delivery")
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

struct Inner<R> {
    runner: R,
    state: Mutex<FetchState>,
    listener: RwLock<Option<UpdateListener>>,
    dispatcher: RwLock<Arc<dyn Dispatcher>>,
}

/// Fetches usage data, keeps the last good reading, and notifies one listener.
///
/// Cloning is cheap; clones share the same state.
pub struct UsageFetcher<R = ProcessRunner> {
    inner: Arc<Inner<R>>,
}

impl<R> Clone for UsageFetcher<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Local wall-clock time for status labels
fn clock_label() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

impl<R: ScriptRunner> UsageFetcher<R> {
    /// Create a fetcher with empty state
    pub fn new(runner: R) -> Self {
        Self {
            inner: Arc::new(Inner {
                runner,
                state: Mutex::new(FetchState::default()),
                listener: RwLock::new(None),
                dispatcher: RwLock::new(Arc::new(DirectDispatcher) as Arc<dyn Dispatcher>),
            }),
        }
    }

    /// Register the update listener, replacing any previous one
    pub fn set_listener<F>(&self, listener: F)
    where
        F: Fn(&FetchSnapshot) + Send + Sync + 'static,
    {
        let listener: UpdateListener = Arc::new(listener);
        *self.inner.listener.write() = Some(listener);
    }

    /// Route listener invocations through a dispatcher
    pub fn set_dispatcher(&self, dispatcher: impl Dispatcher + 'static) {
        *self.inner.dispatcher.write() = Arc::new(dispatcher);
    }

    /// Current state
    pub fn snapshot(&self) -> FetchSnapshot {
        self.inner.state.lock().snapshot()
    }

    /// Start a fetch on a background task without waiting for it.
    ///
    /// Every call starts its own attempt; overlapping attempts are not
    /// deduplicated and the last one to finish determines the state.
    pub fn trigger_fetch(&self) -> JoinHandle<()> {
        let fetcher = self.clone();
        tokio::spawn(async move { fetcher.fetch_once().await })
    }

    /// Run one fetch attempt to completion
    pub async fn fetch_once(&self) {
        let fetch_num = self.begin();

        match self.inner.runner.run().await {
            Ok(output) => {
                debug!(
                    "Fetch #{}: script produced {} bytes in {:.1}s",
                    fetch_num,
                    output.stdout.len(),
                    output.elapsed.as_secs_f32()
                );
                match std::str::from_utf8(&output.stdout) {
                    Ok(text) => self.complete_output(fetch_num, text),
                    Err(e) => self.fail(
                        format!("Parse error: {}", e),
                        format!("Parse error @ {}", clock_label()),
                    ),
                }
            }
            Err(e) => {
                let label = match e {
                    RunError::Timeout(_) => "Timeout",
                    _ => "Error",
                };
                self.fail(e.to_string(), format!("{} @ {}", label, clock_label()));
            }
        }
    }

    /// Mark a new attempt as started and notify
    fn begin(&self) -> u64 {
        let (fetch_num, snapshot) = {
            let mut state = self.inner.state.lock();
            state.fetch_count += 1;
            state.in_flight += 1;
            state.status = format!(
                "Fetching #{} (started {})...",
                state.fetch_count,
                clock_label()
            );
            (state.fetch_count, state.snapshot())
        };

        debug!("Fetch #{} started", fetch_num);
        self.notify(snapshot);
        fetch_num
    }

    /// Apply parsed script output
    fn complete_output(&self, fetch_num: u64, text: &str) {
        let fields = parse_usage_output(text);

        match validate(&fields) {
            Validity::Valid => {
                let snapshot = {
                    let mut state = self.inner.state.lock();
                    state.in_flight = state.in_flight.saturating_sub(1);
                    state.last_good_data = Some(fields);
                    state.last_successful_fetch = Some(Local::now());
                    state.is_stale = false;
                    state.last_error = None;
                    state.status = format!("OK (fetch #{}) @ {}", fetch_num, clock_label());
                    state.snapshot()
                };
                info!("Fetch #{} succeeded", fetch_num);
                self.notify(snapshot);
            }
            Validity::Invalid { parsed_keys } => {
                self.fail(
                    format!("Got ?? values (parsed {} keys)", parsed_keys),
                    format!("Invalid data @ {}", clock_label()),
                );
            }
        }
    }

    /// Record a failed attempt; the last good reading is kept
    fn fail(&self, error: String, status: String) {
        warn!("Usage fetch failed: {}", error);

        let snapshot = {
            let mut state = self.inner.state.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.is_stale = true;
            state.last_error = Some(error);
            state.status = status;
            state.snapshot()
        };
        self.notify(snapshot);
    }

    /// Deliver a snapshot to the listener, if any
    fn notify(&self, snapshot: FetchSnapshot) {
        let Some(listener) = self.inner.listener.read().clone() else {
            return;
        };
        let dispatcher = Arc::clone(&self.inner.dispatcher.read());
        dispatcher.deliver(listener, snapshot);
    }
}
