//! NEAR ledger client for ballot_relay.
//!
//! Function calls are signed locally with the relay account's ed25519 key and sent with
//! `broadcast_tx_commit`; views go through the `call_function` query.

mod nonce;
mod rpc;
mod signer;
mod transaction;

pub use nonce::*;
pub use rpc::*;
pub use signer::*;
pub use transaction::*;

use async_trait::async_trait;
use ballot_relay::{Gas, Ledger, LedgerError, SubmissionOutcome};
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_RPC_URL: &str = "https://rpc.testnet.near.org";

/// Voting contract methods
pub const METHOD_ADD_VOTING_KEY: &str = "addVotingKey";
pub const METHOD_CAST_VOTE: &str = "castVote";
pub const METHOD_VIEW_VOTING_OPTIONS: &str = "viewVotingOptions";
pub const METHOD_VIEW_TIME_LIMITS: &str = "viewTimeLimits";

/// Everything needed to reach the voting contract
#[derive(Debug, Clone)]
pub struct NearConfig {
    pub rpc_url: String,
    pub contract_account_id: String,
    pub relayer_account_id: String,
    pub relayer_private_key: String,
    pub request_timeout: Duration,
}

#[derive(Deserialize, Debug)]
struct AccessKeyView {
    nonce: u64,
    block_hash: String,
}

#[derive(Deserialize, Debug)]
struct CallResult {
    result: Vec<u8>,
}

/// A `Ledger` backed by a NEAR voting contract
#[derive(Debug)]
pub struct NearLedger {
    rpc: RpcClient,
    signer: Signer,
    contract_account_id: String,

    // Concurrent submissions share one access key
    nonces: NonceSequencer,
}

impl NearLedger {
    pub fn new(config: &NearConfig) -> Result<Self, LedgerError> {
        let signer =
            Signer::from_secret_key(&config.relayer_account_id, &config.relayer_private_key)?;
        let rpc = RpcClient::new(&config.rpc_url, config.request_timeout)?;

        log::info!(
            "Relaying to {} on {} as {}",
            config.contract_account_id,
            rpc.url(),
            signer.account_id()
        );

        Ok(NearLedger {
            rpc,
            signer,
            contract_account_id: config.contract_account_id.clone(),
            nonces: NonceSequencer::new(),
        })
    }

    /// Current nonce of the relay's access key, along with a recent block hash
    async fn access_key(&self) -> Result<(u64, [u8; 32]), LedgerError> {
        let access_key: AccessKeyView = self
            .rpc
            .call(
                "query",
                json!({
                    "request_type": "view_access_key",
                    "finality": "final",
                    "account_id": self.signer.account_id(),
                    "public_key": self.signer.public_key_string(),
                }),
            )
            .await?;

        Ok((access_key.nonce, decode_hash(&access_key.block_hash)?))
    }

    async fn function_call(
        &self,
        method_name: &str,
        args: Value,
        gas: Gas,
    ) -> Result<SubmissionOutcome, LedgerError> {
        let args =
            serde_json::to_vec(&args).map_err(|e| LedgerError::MalformedResponse(e.to_string()))?;

        let outcome = self
            .nonces
            .submit(
                || self.access_key(),
                move |nonce, block_hash| async move {
                    let transaction = Transaction::function_call(
                        self.signer.account_id(),
                        self.signer.public_key(),
                        nonce,
                        &self.contract_account_id,
                        block_hash,
                        method_name,
                        args,
                        gas,
                    );
                    let signed = self.signer.sign(transaction)?;

                    self.rpc
                        .call::<Value>("broadcast_tx_commit", json!([signed.to_base64()?]))
                        .await
                },
            )
            .await?;

        parse_outcome(outcome)
    }

    async fn view(&self, method_name: &str) -> Result<Value, LedgerError> {
        let args = base64::engine::general_purpose::STANDARD.encode(b"{}");

        let call: CallResult = self
            .rpc
            .call(
                "query",
                json!({
                    "request_type": "call_function",
                    "finality": "final",
                    "account_id": self.contract_account_id,
                    "method_name": method_name,
                    "args_base64": args,
                }),
            )
            .await?;

        serde_json::from_slice(&call.result)
            .map_err(|e| LedgerError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl Ledger for NearLedger {
    async fn submit_key_registration(
        &self,
        key: &str,
        gas: Gas,
    ) -> Result<SubmissionOutcome, LedgerError> {
        self.function_call(METHOD_ADD_VOTING_KEY, json!({ "_secret_key": key }), gas)
            .await
    }

    async fn submit_vote(
        &self,
        proof_key: &str,
        option: &Value,
        gas: Gas,
    ) -> Result<SubmissionOutcome, LedgerError> {
        self.function_call(
            METHOD_CAST_VOTE,
            json!({ "_secret_key": proof_key, "_vote_option": option }),
            gas,
        )
        .await
    }

    async fn view_voting_options(&self) -> Result<Value, LedgerError> {
        self.view(METHOD_VIEW_VOTING_OPTIONS).await
    }

    async fn view_time_limits(&self) -> Result<Value, LedgerError> {
        self.view(METHOD_VIEW_TIME_LIMITS).await
    }
}

// A committed transaction can still have failed inside the contract
fn parse_outcome(outcome: Value) -> Result<SubmissionOutcome, LedgerError> {
    if let Some(failure) = outcome.get("status").and_then(|status| status.get("Failure")) {
        return Err(LedgerError::ExecutionFailed(failure.to_string()));
    }

    serde_json::from_value(outcome).map_err(|e| LedgerError::MalformedResponse(e.to_string()))
}
