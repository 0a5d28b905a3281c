//! Concurrent-safe keyed store of scan state.
//!
//! Orchestration logic only ever sees the [`ScanStore`] trait, so the
//! in-memory default can be swapped for a durable backend without touching
//! the scheduler. Entries live for the whole process; nothing deletes them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use sondr_common::model::scan::ScanResult;

/// Closure applied to one entry under the store's write lock, so a batch's
/// field updates land as a single atomic snapshot.
pub type UpdateFn = Box<dyn FnOnce(&mut ScanResult) + Send>;

#[async_trait]
pub trait ScanStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Option<ScanResult>;
    async fn put(&self, result: ScanResult);
    /// Applies `apply` to the entry if present; returns whether it was.
    async fn update(&self, id: Uuid, apply: UpdateFn) -> bool;
    async fn for_each(&self, visit: &mut (dyn for<'a> FnMut(&'a ScanResult) + Send));
}

/// Default process-lifetime store.
#[derive(Default)]
pub struct MemoryScanStore {
    entries: RwLock<HashMap<Uuid, ScanResult>>,
}

impl MemoryScanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<dyn ScanStore> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl ScanStore for MemoryScanStore {
    async fn get(&self, id: Uuid) -> Option<ScanResult> {
        self.entries.read().await.get(&id).cloned()
    }

    async fn put(&self, result: ScanResult) {
        self.entries.write().await.insert(result.id, result);
    }

    async fn update(&self, id: Uuid, apply: UpdateFn) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&id) {
            Some(entry) => {
                apply(entry);
                true
            }
            None => false,
        }
    }

    async fn for_each(&self, visit: &mut (dyn for<'a> FnMut(&'a ScanResult) + Send)) {
        let entries = self.entries.read().await;
        for entry in entries.values() {
            visit(entry);
        }
    }
}
