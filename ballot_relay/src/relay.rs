use crate::*;
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, PoisonError};
use tokio::sync::Mutex;

/// When and how queued keys are released to the ledger
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelayPolicy {
    /// Most keys read from the store per flush
    pub batch_limit: usize,

    /// Smallest batch a regular registration will flush
    pub min_flush: usize,

    /// Gas attached to every key registration
    pub gas: Gas,
}

impl Default for RelayPolicy {
    fn default() -> Self {
        RelayPolicy {
            batch_limit: 10,
            min_flush: 3,
            gas: DEFAULT_GAS,
        }
    }
}

/// Result of `KeyRelay::enqueue_and_maybe_flush`
#[derive(Debug, Default)]
pub struct Admission {
    /// The candidate was not queued before
    pub accepted: bool,

    /// Set when the registration pushed the queue over the flush threshold
    pub flush: Option<FlushReport>,
}

/// Per-key results of a flush
///
/// Every key listed here has already left the store, failed or not.
#[derive(Debug, Default)]
pub struct FlushReport {
    pub registered: Vec<KeyId>,
    pub failed: Vec<(KeyId, LedgerError)>,
}

impl FlushReport {
    /// Number of keys submitted to the ledger
    pub fn attempted(&self) -> usize {
        self.registered.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempted() == 0
    }
}

/// Queues voting keys and releases them to the ledger in shuffled batches
pub struct KeyRelay {
    store: Arc<dyn KeyStore>,
    ledger: Arc<dyn Ledger>,
    policy: RelayPolicy,

    // Held while a batch is claimed, not while it is submitted
    claim_lock: Mutex<()>,

    rng: std::sync::Mutex<StdRng>,
}

impl KeyRelay {
    pub fn new(store: Arc<dyn KeyStore>, ledger: Arc<dyn Ledger>, policy: RelayPolicy) -> Self {
        Self::with_rng(store, ledger, policy, StdRng::from_entropy())
    }

    /// Build a relay that shuffles batches with the given RNG
    pub fn with_rng(
        store: Arc<dyn KeyStore>,
        ledger: Arc<dyn Ledger>,
        policy: RelayPolicy,
        rng: StdRng,
    ) -> Self {
        KeyRelay {
            store,
            ledger,
            policy,
            claim_lock: Mutex::new(()),
            rng: std::sync::Mutex::new(rng),
        }
    }

    pub fn policy(&self) -> &RelayPolicy {
        &self.policy
    }

    /// Queue a candidate key, then flush if enough keys are waiting.
    ///
    /// Queuing a key that is already waiting is not an error, `accepted` is just false.
    pub async fn enqueue_and_maybe_flush(&self, candidate: &str) -> Result<Admission, StoreError> {
        let registration = self.store.try_register(candidate).await?;
        if registration.inserted {
            log::info!("Key added successfully");
        } else {
            log::info!("Item with key already exists");
        }

        let flush = self.flush_at_least(self.policy.min_flush).await?;

        Ok(Admission {
            accepted: registration.inserted,
            flush,
        })
    }

    /// Flush whatever is queued, ignoring the size threshold.
    ///
    /// Callers must have authenticated the request.
    pub async fn force_flush(&self) -> Result<FlushReport, StoreError> {
        let report = self.flush_at_least(0).await?;
        Ok(report.unwrap_or_default())
    }

    async fn flush_at_least(&self, min_size: usize) -> Result<Option<FlushReport>, StoreError> {
        let batch = {
            let _claim = self.claim_lock.lock().await;
            self.store
                .claim_batch(self.policy.batch_limit, min_size)
                .await?
        };

        if batch.is_empty() {
            return Ok(None);
        }

        Ok(Some(self.submit_batch(batch).await))
    }

    // Claimed keys are gone from the store. A key whose registration fails is lost.
    async fn submit_batch(&self, mut batch: Vec<PendingKey>) -> FlushReport {
        {
            // A panic mid-shuffle leaves the RNG usable
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            shuffle(&mut batch, &mut *rng);
        }

        let gas = self.policy.gas;
        let ledger = &self.ledger;
        let submissions = batch.iter().map(|pending| async move {
            let result = ledger
                .submit_key_registration(&pending.key, gas)
                .await
                .map(|_| ());
            (pending.id, result)
        });

        let mut report = FlushReport::default();
        for (id, result) in join_all(submissions).await {
            match result {
                Ok(()) => report.registered.push(id),
                Err(e) => {
                    log::warn!("Failed to register queued key {}: {}", id, e);
                    report.failed.push((id, e));
                }
            }
        }

        log::info!(
            "Flushed {} keys to the ledger ({} failed)",
            report.attempted(),
            report.failed.len()
        );
        report
    }
}
