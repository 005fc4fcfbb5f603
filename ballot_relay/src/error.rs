use thiserror::Error;

/// Key-store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ballot_relay: store error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("ballot_relay: store lock poisoned")]
    Poisoned,

    #[error("ballot_relay: invalid collection name `{0}`")]
    InvalidCollectionName(String),

    #[error("ballot_relay: invalid store uri `{0}`")]
    InvalidUri(String),
}

/// Errors returned by a ledger client
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("ballot_relay ledger: transport error: {0}")]
    Transport(String),

    #[error("ballot_relay ledger: rpc error: {0}")]
    Rpc(String),

    #[error("ballot_relay ledger: execution failed: {0}")]
    ExecutionFailed(String),

    #[error("ballot_relay ledger: malformed response: {0}")]
    MalformedResponse(String),

    #[error("ballot_relay ledger: signer key error: {0}")]
    SignerKey(String),
}

/// Vote casting errors
#[derive(Debug, Error)]
pub enum VoteSubmissionError {
    #[error("ballot_relay: vote submission failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("ballot_relay: vote outcome has no receipt log")]
    MissingLog,
}

/// Errors from ledger view queries
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("ballot_relay: view query failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("ballot_relay: malformed view result: {0}")]
    Malformed(#[from] serde_json::Error),
}
