use crate::*;
use async_trait::async_trait;
use serde_json::Value;

/// Gas attached to a ledger call
pub type Gas = u64;

/// Gas budget for every relayed call (300 Tgas)
pub const DEFAULT_GAS: Gas = 300_000_000_000_000;

/// The voting contract, as seen by the relay
///
/// Implementations own their connection and are shared between requests, so they must be
/// built once and passed around behind an `Arc`.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Register an anonymous voting key with the contract
    async fn submit_key_registration(
        &self,
        key: &str,
        gas: Gas,
    ) -> Result<SubmissionOutcome, LedgerError>;

    /// Cast a vote with a previously registered key
    async fn submit_vote(
        &self,
        proof_key: &str,
        option: &Value,
        gas: Gas,
    ) -> Result<SubmissionOutcome, LedgerError>;

    /// Raw result of the contract's voting-options view
    async fn view_voting_options(&self) -> Result<Value, LedgerError>;

    /// Raw result of the contract's time-limits view
    async fn view_time_limits(&self) -> Result<Value, LedgerError>;
}

/// The final outcome of a ledger call
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SubmissionOutcome {
    #[serde(default)]
    pub receipts_outcome: Vec<ReceiptOutcome>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ReceiptOutcome {
    pub outcome: ExecutionOutcome,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ExecutionOutcome {
    #[serde(default)]
    pub logs: Vec<String>,
}

impl SubmissionOutcome {
    /// An outcome with a single receipt carrying the given logs
    pub fn with_logs<I, S>(logs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SubmissionOutcome {
            receipts_outcome: vec![ReceiptOutcome {
                outcome: ExecutionOutcome {
                    logs: logs.into_iter().map(Into::into).collect(),
                },
            }],
        }
    }

    /// The first log line of the first receipt
    pub fn first_log(&self) -> Option<&str> {
        self.receipts_outcome
            .first()
            .and_then(|receipt| receipt.outcome.logs.first())
            .map(String::as_str)
    }
}
