use crate::*;
use serde_json::Value;
use std::sync::Arc;

/// The ledger's answer to a cast vote
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VoteResult {
    /// First log line of the first receipt, as written by the contract
    pub log: String,
}

/// Relays votes to the ledger
///
/// The option is passed through untouched, checking it against the ballot is the contract's job.
pub struct VoteRelay {
    ledger: Arc<dyn Ledger>,
    gas: Gas,
}

impl VoteRelay {
    pub fn new(ledger: Arc<dyn Ledger>, gas: Gas) -> Self {
        VoteRelay { ledger, gas }
    }

    pub async fn cast_vote(
        &self,
        proof_key: &str,
        option: &Value,
    ) -> Result<VoteResult, VoteSubmissionError> {
        let outcome = self.ledger.submit_vote(proof_key, option, self.gas).await?;
        let log = outcome
            .first_log()
            .ok_or(VoteSubmissionError::MissingLog)?;

        Ok(VoteResult {
            log: log.to_owned(),
        })
    }
}
