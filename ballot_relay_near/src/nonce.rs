use ballot_relay::LedgerError;
use std::future::Future;
use tokio::sync::Mutex;

/// Orders transactions signed with one access key
///
/// The chain rejects a nonce that is not above the last one it committed, so a nonce stays
/// reserved until its transaction has been broadcast. Submissions through one sequencer go
/// out one at a time, in the order they acquired it.
#[derive(Debug, Default)]
pub struct NonceSequencer {
    last: Mutex<Option<u64>>,
}

impl NonceSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the access key with `query`, then `send` a transaction with the next nonce.
    ///
    /// `query` returns the nonce currently on chain and a recent block hash.
    pub async fn submit<Q, QF, S, SF, T>(&self, query: Q, send: S) -> Result<T, LedgerError>
    where
        Q: FnOnce() -> QF,
        QF: Future<Output = Result<(u64, [u8; 32]), LedgerError>>,
        S: FnOnce(u64, [u8; 32]) -> SF,
        SF: Future<Output = Result<T, LedgerError>>,
    {
        let mut last = self.last.lock().await;

        let (on_chain, block_hash) = query().await?;
        let nonce = next_nonce(*last, on_chain);

        // A failed send may still have used the nonce
        *last = Some(nonce);

        send(nonce, block_hash).await
    }
}

fn next_nonce(last: Option<u64>, on_chain: u64) -> u64 {
    match last {
        Some(last) if last >= on_chain => last + 1,
        _ => on_chain + 1,
    }
}
