use crate::*;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// A call received by `MockLedger`
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCall {
    RegisterKey { key: String, gas: Gas },
    Vote { key: String, option: Value, gas: Gas },
    ViewVotingOptions,
    ViewTimeLimits,
}

/// An in-memory ledger for tests and dry runs
///
/// Records every call and answers with canned results. Key registrations succeed unless the
/// key was marked with `fail_key`.
pub struct MockLedger {
    calls: Mutex<Vec<LedgerCall>>,
    failing_keys: Mutex<HashSet<String>>,
    vote_outcome: Mutex<Result<SubmissionOutcome, LedgerError>>,
    voting_options: Mutex<Result<Value, LedgerError>>,
    time_limits: Mutex<Result<Value, LedgerError>>,
}

impl Default for MockLedger {
    fn default() -> Self {
        MockLedger {
            calls: Mutex::new(vec![]),
            failing_keys: Mutex::new(HashSet::new()),
            vote_outcome: Mutex::new(Ok(SubmissionOutcome::with_logs(vec!["Vote cast"]))),
            voting_options: Mutex::new(Ok(Value::Array(vec![]))),
            time_limits: Mutex::new(Ok(serde_json::json!({
                "vote_time": 0,
                "register_time": 0
            }))),
        }
    }
}

// The mock is never shared across a panic that matters, so a poisoned lock is still usable
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make registrations of `key` fail
    pub fn fail_key(&self, key: &str) {
        lock(&self.failing_keys).insert(key.to_owned());
    }

    pub fn set_vote_outcome(&self, outcome: Result<SubmissionOutcome, LedgerError>) {
        *lock(&self.vote_outcome) = outcome;
    }

    pub fn set_voting_options(&self, options: Result<Value, LedgerError>) {
        *lock(&self.voting_options) = options;
    }

    pub fn set_time_limits(&self, limits: Result<Value, LedgerError>) {
        *lock(&self.time_limits) = limits;
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<LedgerCall> {
        lock(&self.calls).clone()
    }

    /// Keys passed to `submit_key_registration`, in submission order
    pub fn registered_keys(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                LedgerCall::RegisterKey { key, .. } => Some(key.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: LedgerCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn submit_key_registration(
        &self,
        key: &str,
        gas: Gas,
    ) -> Result<SubmissionOutcome, LedgerError> {
        self.record(LedgerCall::RegisterKey {
            key: key.to_owned(),
            gas,
        });

        if lock(&self.failing_keys).contains(key) {
            return Err(LedgerError::ExecutionFailed(
                "mock: registration rejected".to_owned(),
            ));
        }
        Ok(SubmissionOutcome::with_logs(vec!["Voting key added"]))
    }

    async fn submit_vote(
        &self,
        proof_key: &str,
        option: &Value,
        gas: Gas,
    ) -> Result<SubmissionOutcome, LedgerError> {
        self.record(LedgerCall::Vote {
            key: proof_key.to_owned(),
            option: option.clone(),
            gas,
        });
        lock(&self.vote_outcome).clone()
    }

    async fn view_voting_options(&self) -> Result<Value, LedgerError> {
        self.record(LedgerCall::ViewVotingOptions);
        lock(&self.voting_options).clone()
    }

    async fn view_time_limits(&self) -> Result<Value, LedgerError> {
        self.record(LedgerCall::ViewTimeLimits);
        lock(&self.time_limits).clone()
    }
}
