use crate::domain::idempotency::IdempotencyRecord;
use crate::domain::payment::Payment;
use crate::domain::ports::{Claim, ClaimSlot, IdempotencyStore, PaymentStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{RwLock, watch};
use tracing::{debug, warn};
use uuid::Uuid;

/// Shard count used by the `new()` constructors.
pub const DEFAULT_SHARDS: usize = 16;

fn shard_index<K: Hash + ?Sized>(key: &K, shards: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() % shards as u64) as usize
}

/// A thread-safe in-memory store for payment records.
///
/// Records are spread over independently locked shards keyed by payment id, so
/// writers to different payments rarely contend. `Clone` shares the shards.
#[derive(Clone)]
pub struct InMemoryPaymentStore {
    shards: Arc<[RwLock<HashMap<Uuid, Payment>>]>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty store with [`DEFAULT_SHARDS`] shards.
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Creates a new, empty store. A shard count of zero is treated as one.
    pub fn with_shards(shards: usize) -> Self {
        let shards = (0..shards.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect();
        Self { shards }
    }

    fn shard(&self, id: &Uuid) -> &RwLock<HashMap<Uuid, Payment>> {
        &self.shards[shard_index(id, self.shards.len())]
    }
}

impl Default for InMemoryPaymentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn add(&self, payment: Payment) -> Result<()> {
        let mut payments = self.shard(&payment.id()).write().await;
        payments.insert(payment.id(), payment);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Payment>> {
        let payments = self.shard(&id).read().await;
        Ok(payments.get(&id).cloned())
    }

    async fn count(&self) -> Result<usize> {
        let mut total = 0;
        for shard in self.shards.iter() {
            total += shard.read().await.len();
        }
        Ok(total)
    }
}

enum Slot {
    /// Claimed and being processed. Flips to `true` once the claimant finishes.
    InFlight(watch::Sender<bool>),
    Completed(IdempotencyRecord),
}

type SlotShard = Mutex<HashMap<String, Slot>>;

struct Slots {
    shards: Vec<SlotShard>,
}

impl Slots {
    // Critical sections never await, so a plain mutex is enough and lets a
    // dropped claim release itself synchronously.
    fn lock(&self, key: &str) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.shards[shard_index(key, self.shards.len())]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolves the in-flight slot for `key`, either to a completed record or by
    /// removing it. Returns the record stored for the key afterwards.
    fn finish(&self, key: &str, record: Option<IdempotencyRecord>) -> Option<IdempotencyRecord> {
        let mut slots = self.lock(key);
        let current = match slots.remove(key) {
            Some(Slot::InFlight(done)) => {
                let stored = record.clone();
                if let Some(record) = record {
                    slots.insert(key.to_string(), Slot::Completed(record));
                }
                done.send_replace(true);
                return stored;
            }
            Some(Slot::Completed(existing)) => existing,
            None => return None,
        };
        // Completed through `save` while this claim was in flight; keep it.
        slots.insert(key.to_string(), Slot::Completed(current.clone()));
        Some(current)
    }
}

/// A thread-safe in-memory idempotency store.
///
/// Besides plain get/save, it implements the claim protocol: the first caller
/// to claim a key gets a [`ClaimSlot`] and performs the work, later callers wait
/// on that key alone until the claimant completes or releases it. Completed
/// records are never changed or evicted.
#[derive(Clone)]
pub struct InMemoryIdempotencyStore {
    slots: Arc<Slots>,
}

impl InMemoryIdempotencyStore {
    /// Creates a new, empty store with [`DEFAULT_SHARDS`] shards.
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Creates a new, empty store. A shard count of zero is treated as one.
    pub fn with_shards(shards: usize) -> Self {
        let shards = (0..shards.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect();
        Self {
            slots: Arc::new(Slots { shards }),
        }
    }
}

impl Default for InMemoryIdempotencyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn get(&self, key: &str) -> Result<Option<IdempotencyRecord>> {
        let slots = self.slots.lock(key);
        match slots.get(key) {
            Some(Slot::Completed(record)) => Ok(Some(record.clone())),
            _ => Ok(None),
        }
    }

    async fn save(&self, key: &str, record: IdempotencyRecord) -> Result<bool> {
        let mut slots = self.slots.lock(key);
        match slots.remove(key) {
            Some(Slot::Completed(existing)) => {
                slots.insert(key.to_string(), Slot::Completed(existing));
                Ok(false)
            }
            Some(Slot::InFlight(done)) => {
                slots.insert(key.to_string(), Slot::Completed(record));
                done.send_replace(true);
                Ok(true)
            }
            None => {
                slots.insert(key.to_string(), Slot::Completed(record));
                Ok(true)
            }
        }
    }

    async fn claim(&self, key: &str) -> Result<Claim> {
        loop {
            let mut done = {
                let mut slots = self.slots.lock(key);
                match slots.get(key) {
                    Some(Slot::Completed(record)) => return Ok(Claim::Completed(record.clone())),
                    Some(Slot::InFlight(done)) => done.subscribe(),
                    None => {
                        let (done, _) = watch::channel(false);
                        slots.insert(key.to_string(), Slot::InFlight(done));
                        return Ok(Claim::Acquired(Box::new(InMemoryClaim {
                            slots: Arc::clone(&self.slots),
                            key: key.to_string(),
                            staged: None,
                            finished: false,
                        })));
                    }
                }
            };

            debug!(key, "idempotency key in flight, waiting for claimant");
            // The sender lives in the slot until it is finished, so this only
            // returns once the claimant completed or released the key.
            let _ = done.wait_for(|finished| *finished).await;
        }
    }
}

struct InMemoryClaim {
    slots: Arc<Slots>,
    key: String,
    staged: Option<IdempotencyRecord>,
    finished: bool,
}

impl ClaimSlot for InMemoryClaim {
    fn stage(&mut self, record: IdempotencyRecord) {
        self.staged = Some(record);
    }

    fn complete(mut self: Box<Self>, record: IdempotencyRecord) -> IdempotencyRecord {
        self.finished = true;
        self.slots
            .finish(&self.key, Some(record.clone()))
            .unwrap_or(record)
    }

    fn release(mut self: Box<Self>) {
        self.finished = true;
        self.slots.finish(&self.key, None);
    }
}

impl Drop for InMemoryClaim {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        match self.staged.take() {
            Some(record) => {
                warn!(key = %self.key, "idempotency claim dropped unfinished, publishing staged record");
                self.slots.finish(&self.key, Some(record));
            }
            None => {
                warn!(key = %self.key, "idempotency claim dropped unfinished, releasing");
                self.slots.finish(&self.key, None);
            }
        }
    }
}
