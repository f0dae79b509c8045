// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! In-memory keyed store with debounced persistence.
//!
//! Reads and mutations are synchronous and take a short lock that is never
//! held across an `.await`. Persistence runs on the tokio runtime:
//!
//! 1. A mutation arms one timer of `flush_delay` unless one is armed already.
//! 2. When it fires, the whole map is serialized and handed to the target.
//!    If a write is still running the timer is re-armed instead.
//! 3. A failed write is logged and counted. The store stays dirty and the
//!    next mutation (or [`Store::flush`]) writes again.
//!
//! Construction reads the target synchronously. A missing, unreadable or
//! malformed document leaves the store empty; see [`ReloadOutcome`].

pub mod phase;

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;

use tinta_kernel::config::DEFAULT_FLUSH_DELAY_MS;

use crate::persistence::{PersistTarget, StoreError, StoreResult};
use phase::{Action, FlushPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Debounce window between the first mutation of a burst and its flush.
    pub flush_delay: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            flush_delay: Duration::from_millis(DEFAULT_FLUSH_DELAY_MS),
        }
    }
}

/// What happened when the store read its target at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReloadOutcome {
    /// No target configured.
    Volatile,
    /// Target had no document yet.
    Missing,
    Loaded { records: usize },
    Unreadable { error: String },
    Malformed { error: String },
}

struct State<R> {
    records: FxHashMap<String, R>,
    phase: FlushPhase,
    dirty: bool,
}

struct Inner<R> {
    name: String,
    config: StoreConfig,
    target: Option<Arc<dyn PersistTarget>>,
    reload: ReloadOutcome,
    state: Mutex<State<R>>,
    // Bumped after every finished write
    completions: watch::Sender<u64>,
}

pub struct Store<R> {
    inner: Arc<Inner<R>>,
}

impl<R> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

enum FlushStep {
    Write(Vec<u8>),
    Wait(watch::Receiver<u64>),
}

impl<R> Store<R>
where
    R: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// A store that never persists.
    pub fn volatile(name: impl Into<String>) -> Self {
        Self::open(name, None, StoreConfig::default())
    }

    /// Creates the store and loads whatever `target` currently holds.
    pub fn open(
        name: impl Into<String>,
        target: Option<Arc<dyn PersistTarget>>,
        config: StoreConfig,
    ) -> Self {
        let name = name.into();
        let (records, reload) = match &target {
            Some(target) => Self::reload(&name, target.as_ref()),
            None => (FxHashMap::default(), ReloadOutcome::Volatile),
        };
        metrics::gauge!("tinta_store_records", records.len() as f64, "store" => name.clone());

        let (completions, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                name,
                config,
                target,
                reload,
                state: Mutex::new(State {
                    records,
                    phase: FlushPhase::Idle,
                    dirty: false,
                }),
                completions,
            }),
        }
    }

    fn reload(name: &str, target: &dyn PersistTarget) -> (FxHashMap<String, R>, ReloadOutcome) {
        let location = target.describe();
        match target.load() {
            Ok(None) => {
                tracing::info!(store = name, %location, "No persisted document, starting empty");
                (FxHashMap::default(), ReloadOutcome::Missing)
            }
            Ok(Some(bytes)) => match serde_json::from_slice::<FxHashMap<String, R>>(&bytes) {
                Ok(records) => {
                    tracing::info!(store = name, %location, records = records.len(), "Store reloaded");
                    let outcome = ReloadOutcome::Loaded { records: records.len() };
                    (records, outcome)
                }
                Err(e) => {
                    tracing::warn!(store = name, %location, error = %e, "Persisted document is malformed, starting empty");
                    (FxHashMap::default(), ReloadOutcome::Malformed { error: e.to_string() })
                }
            },
            Err(e) => {
                tracing::warn!(store = name, %location, error = %e, "Persisted document is unreadable, starting empty");
                (FxHashMap::default(), ReloadOutcome::Unreadable { error: e.to_string() })
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn reload_outcome(&self) -> &ReloadOutcome {
        &self.inner.reload
    }

    pub fn is_persistent(&self) -> bool {
        self.inner.target.is_some()
    }

    pub fn phase(&self) -> FlushPhase {
        self.inner.state.lock().phase
    }

    /// Whether a mutation happened since the last write started.
    pub fn is_dirty(&self) -> bool {
        self.inner.state.lock().dirty
    }

    pub fn get(&self, key: &str) -> Option<R> {
        self.inner.state.lock().records.get(key).cloned()
    }

    /// Snapshot of all records, in no particular order.
    pub fn list(&self) -> Vec<R> {
        self.inner.state.lock().records.values().cloned().collect()
    }

    pub fn keys(&self) -> FxHashSet<String> {
        self.inner.state.lock().records.keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.inner.state.lock().records.len()
    }

    /// Inserts or overwrites.
    pub fn add(&self, key: impl Into<String>, record: R) {
        let action = {
            let mut st = self.inner.state.lock();
            st.records.insert(key.into(), record);
            self.after_mutation(&mut st)
        };
        self.apply(action);
    }

    /// Removes `key` if present.
    pub fn remove(&self, key: &str) {
        let action = {
            let mut st = self.inner.state.lock();
            st.records.remove(key);
            self.after_mutation(&mut st)
        };
        self.apply(action);
    }

    /// Empties the map without scheduling a flush.
    pub fn clear(&self) {
        self.inner.state.lock().records.clear();
        self.record_gauge(0);
    }

    fn after_mutation(&self, st: &mut State<R>) -> Action {
        st.dirty = true;
        self.record_gauge(st.records.len());
        if self.inner.target.is_none() {
            return Action::None;
        }
        st.phase.on_mutation()
    }

    fn record_gauge(&self, len: usize) {
        metrics::gauge!("tinta_store_records", len as f64, "store" => self.inner.name.clone());
    }

    fn apply(&self, action: Action) {
        match action {
            Action::None => {}
            Action::ArmTimer => self.arm_timer(),
            // Flushes start only from the timer task or `flush()`
            Action::StartFlush => {}
        }
    }

    fn arm_timer(&self) {
        let delay = self.inner.config.flush_delay;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(store = %self.inner.name, ?delay, "Flush scheduled");
                let store = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    store.on_timer().await;
                });
            }
            Err(_) => {
                tracing::warn!(store = %self.inner.name, "No async runtime, flush deferred until flush() is called");
                self.inner.state.lock().phase.disarm();
            }
        }
    }

    async fn on_timer(&self) {
        let bytes = {
            let mut st = self.inner.state.lock();
            match st.phase.on_timer() {
                Action::StartFlush => match Self::encode(&mut st) {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        tracing::error!(store = %self.inner.name, error = %e, "Failed to serialize store");
                        metrics::counter!("tinta_store_flush_failures_total", 1, "store" => self.inner.name.clone());
                        None
                    }
                },
                Action::ArmTimer => {
                    tracing::debug!(store = %self.inner.name, "Flush still in flight, rescheduling");
                    metrics::counter!("tinta_store_flush_reschedules_total", 1, "store" => self.inner.name.clone());
                    drop(st);
                    self.arm_timer();
                    None
                }
                Action::None => None,
            }
        };

        if let Some(bytes) = bytes {
            // Errors are already logged and counted
            let _ = self.write(bytes).await;
        }
    }

    /// Serializes the whole map and clears the dirty marker. The caller must
    /// have moved the phase into a flushing state; on error it is settled here.
    fn encode(st: &mut State<R>) -> StoreResult<Vec<u8>> {
        match serde_json::to_vec(&st.records) {
            Ok(bytes) => {
                st.dirty = false;
                Ok(bytes)
            }
            Err(e) => {
                st.phase.on_flush_done();
                Err(e.into())
            }
        }
    }

    async fn write(&self, bytes: Vec<u8>) -> StoreResult<()> {
        let Some(target) = self.inner.target.clone() else {
            return Ok(());
        };

        let started = Instant::now();
        let len = bytes.len();
        let result = target.write(bytes).await;

        {
            let mut st = self.inner.state.lock();
            if result.is_err() {
                st.dirty = true;
            }
            st.phase.on_flush_done();
        }

        let name = self.inner.name.clone();
        match &result {
            Ok(()) => {
                metrics::counter!("tinta_store_flushes_total", 1, "store" => name.clone());
                metrics::histogram!("tinta_store_flush_duration_seconds", started.elapsed().as_secs_f64(), "store" => name);
                tracing::debug!(store = %self.inner.name, bytes = len, location = %target.describe(), "Store flushed");
            }
            Err(e) => {
                metrics::counter!("tinta_store_flush_failures_total", 1, "store" => name);
                tracing::error!(store = %self.inner.name, location = %target.describe(), error = %e, "Store flush failed");
            }
        }

        self.inner.completions.send_modify(|n| *n += 1);
        result
    }

    /// Writes the current state now, after any write already in flight.
    ///
    /// Used to drain on shutdown. A no-op for volatile stores.
    pub async fn flush(&self) -> Result<(), StoreError> {
        if self.inner.target.is_none() {
            return Ok(());
        }

        loop {
            let step = {
                let mut st = self.inner.state.lock();
                if st.phase.begin_manual() {
                    FlushStep::Write(Self::encode(&mut st)?)
                } else {
                    // Subscribed under the lock, so the running write's
                    // completion cannot be missed.
                    FlushStep::Wait(self.inner.completions.subscribe())
                }
            };

            match step {
                FlushStep::Write(bytes) => return self.write(bytes).await,
                FlushStep::Wait(mut rx) => {
                    let _ = rx.changed().await;
                }
            }
        }
    }
}
