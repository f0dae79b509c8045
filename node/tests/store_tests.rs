// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use tinta_node::persistence::{PersistTarget, StoreResult};
use tinta_node::store::phase::FlushPhase;
use tinta_node::store::{ReloadOutcome, Store, StoreConfig};

const DELAY: Duration = Duration::from_millis(250);

/// In-memory target that records every write and how many overlapped.
#[derive(Default)]
struct RecordingTarget {
    initial: Option<Vec<u8>>,
    writes: Mutex<Vec<Vec<u8>>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    fail: AtomicBool,
    // When set, each write holds until a permit is released
    gate: Option<Arc<Semaphore>>,
}

impl RecordingTarget {
    fn gated(gate: Arc<Semaphore>) -> Self {
        Self { gate: Some(gate), ..Default::default() }
    }

    fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    fn document(&self, n: usize) -> HashMap<String, u32> {
        serde_json::from_slice(&self.writes.lock().unwrap()[n]).unwrap()
    }
}

#[async_trait]
impl PersistTarget for RecordingTarget {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn load(&self) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.initial.clone())
    }

    async fn write(&self, bytes: Vec<u8>) -> StoreResult<()> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
        }
        self.writes.lock().unwrap().push(bytes);
        Ok(())
    }
}

fn open(target: Arc<RecordingTarget>) -> Store<u32> {
    Store::open("test", Some(target as Arc<dyn PersistTarget>), StoreConfig { flush_delay: DELAY })
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_burst_coalesces_into_one_write() {
    let target = Arc::new(RecordingTarget::default());
    let store = open(target.clone());

    for i in 0..10 {
        store.add(format!("k{}", i), i);
    }
    assert_eq!(store.phase(), FlushPhase::Scheduled);
    assert!(store.is_dirty());

    tokio::time::sleep(DELAY * 4).await;
    settle().await;

    assert_eq!(target.write_count(), 1);
    assert_eq!(target.document(0).len(), 10);
    assert_eq!(store.phase(), FlushPhase::Idle);
    assert!(!store.is_dirty());
}

#[tokio::test(start_paused = true)]
async fn test_mutation_during_write_reschedules_without_overlap() {
    let gate = Arc::new(Semaphore::new(0));
    let target = Arc::new(RecordingTarget::gated(gate.clone()));
    let store = open(target.clone());

    // 1. First write starts and blocks
    store.add("a", 1);
    tokio::time::sleep(DELAY + Duration::from_millis(50)).await;
    assert_eq!(store.phase(), FlushPhase::Flushing);

    // 2. Mutation while flushing arms exactly one follow-up
    store.add("b", 2);
    assert_eq!(store.phase(), FlushPhase::FlushingPending);

    // 3. Its timer fires while the write is still running and re-arms
    tokio::time::sleep(DELAY + Duration::from_millis(50)).await;
    assert_eq!(store.phase(), FlushPhase::FlushingPending);
    assert_eq!(target.write_count(), 0);

    // 4. Release; the follow-up write carries both records
    gate.add_permits(10);
    tokio::time::sleep(DELAY * 4).await;
    settle().await;

    assert_eq!(target.write_count(), 2);
    assert_eq!(target.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(target.document(0).len(), 1);
    assert_eq!(target.document(1), HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]));
    assert_eq!(store.phase(), FlushPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_flush_waits_for_in_flight_write() {
    let gate = Arc::new(Semaphore::new(0));
    let target = Arc::new(RecordingTarget::gated(gate.clone()));
    let store = open(target.clone());

    store.add("a", 1);
    tokio::time::sleep(DELAY + Duration::from_millis(50)).await;
    store.add("b", 2);

    let drain = {
        let store = store.clone();
        tokio::spawn(async move { store.flush().await })
    };
    settle().await;
    assert!(!drain.is_finished());
    assert_eq!(target.max_active.load(Ordering::SeqCst), 1);

    gate.add_permits(10);
    drain.await.unwrap().unwrap();

    assert!(target.write_count() >= 2);
    assert_eq!(target.document(1).len(), 2);
    assert_eq!(target.max_active.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_write_keeps_store_dirty() {
    let target = Arc::new(RecordingTarget::default());
    target.fail.store(true, Ordering::SeqCst);
    let store = open(target.clone());

    store.add("a", 1);
    tokio::time::sleep(DELAY * 2).await;
    settle().await;

    assert_eq!(target.write_count(), 0);
    assert_eq!(store.phase(), FlushPhase::Idle);
    assert!(store.is_dirty());
    assert!(store.flush().await.is_err());

    // Next attempt goes through
    target.fail.store(false, Ordering::SeqCst);
    store.flush().await.unwrap();
    assert_eq!(target.write_count(), 1);
    assert!(!store.is_dirty());
}

#[tokio::test(start_paused = true)]
async fn test_overwrite_and_delete() {
    let target = Arc::new(RecordingTarget::default());
    let store = open(target.clone());

    store.add("k", 1);
    store.add("k", 2);
    assert_eq!(store.get("k"), Some(2));
    assert_eq!(store.count(), 1);

    store.remove("k");
    store.remove("k");
    store.remove("never-there");
    assert_eq!(store.get("k"), None);
    assert_eq!(store.count(), 0);

    tokio::time::sleep(DELAY * 2).await;
    settle().await;
    assert_eq!(target.write_count(), 1);
    assert!(target.document(0).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_clear_does_not_schedule() {
    let target = Arc::new(RecordingTarget {
        initial: Some(br#"{"a":1,"b":2}"#.to_vec()),
        ..Default::default()
    });
    let store = open(target.clone());
    assert_eq!(store.reload_outcome(), &ReloadOutcome::Loaded { records: 2 });

    store.clear();
    assert_eq!(store.count(), 0);
    assert_eq!(store.phase(), FlushPhase::Idle);

    tokio::time::sleep(DELAY * 2).await;
    assert_eq!(target.write_count(), 0);
}

#[tokio::test]
async fn test_volatile_store() {
    let store: Store<u32> = Store::volatile("scratch");
    assert!(!store.is_persistent());
    assert_eq!(store.reload_outcome(), &ReloadOutcome::Volatile);

    store.add("a", 1);
    store.add("b", 2);
    assert_eq!(store.phase(), FlushPhase::Idle);
    assert_eq!(store.keys().len(), 2);

    let mut values = store.list();
    values.sort();
    assert_eq!(values, vec![1, 2]);
    store.flush().await.unwrap();
}

#[test]
fn test_mutation_without_runtime_is_deferred() {
    let target = Arc::new(RecordingTarget::default());
    let store = open(target.clone());

    store.add("a", 1);
    assert_eq!(store.phase(), FlushPhase::Idle);
    assert!(store.is_dirty());

    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(store.flush()).unwrap();
    assert_eq!(target.write_count(), 1);
}

#[test]
fn test_malformed_document_starts_empty() {
    let target = Arc::new(RecordingTarget {
        initial: Some(b"{ not json".to_vec()),
        ..Default::default()
    });
    let store = open(target);
    assert_eq!(store.count(), 0);
    assert!(matches!(store.reload_outcome(), ReloadOutcome::Malformed { .. }));
}
