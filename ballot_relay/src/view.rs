use crate::*;
use serde::de;
use serde_json::Value;
use std::sync::Arc;

/// A ballot option and its current count
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VotingOption {
    pub name: String,
    pub vote_count: u64,
}

/// Registration and voting deadlines, as set on the contract
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeLimits {
    pub vote_time: u64,
    pub register_time: u64,
}

// The contract returns options as `[name, count]` pairs
#[derive(Deserialize)]
struct RawVotingOption(
    String,
    #[serde(deserialize_with = "u64_from_number_or_string")] u64,
);

#[derive(Deserialize)]
struct RawTimeLimits {
    #[serde(deserialize_with = "u64_from_number_or_string")]
    vote_time: u64,
    #[serde(deserialize_with = "u64_from_number_or_string")]
    register_time: u64,
}

/// Read-only access to the contract's views
///
/// Nothing is cached: every call goes to the ledger.
pub struct ViewGateway {
    ledger: Arc<dyn Ledger>,
}

impl ViewGateway {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        ViewGateway { ledger }
    }

    pub async fn voting_options(&self) -> Result<Vec<VotingOption>, ViewError> {
        let raw = self.ledger.view_voting_options().await?;
        let options: Vec<RawVotingOption> = serde_json::from_value(unwrap_json_string(raw)?)?;

        Ok(options
            .into_iter()
            .map(|RawVotingOption(name, vote_count)| VotingOption { name, vote_count })
            .collect())
    }

    pub async fn time_limits(&self) -> Result<TimeLimits, ViewError> {
        let raw = unwrap_json_string(self.ledger.view_time_limits().await?)?;

        // A derived struct would also accept `[vote_time, register_time]`
        if !raw.is_object() {
            return Err(ViewError::Malformed(de::Error::custom(format!(
                "time limits must be an object, got {}",
                raw
            ))));
        }
        let limits: RawTimeLimits = serde_json::from_value(raw)?;

        Ok(TimeLimits {
            vote_time: limits.vote_time,
            register_time: limits.register_time,
        })
    }
}

// Some views return their result JSON-encoded a second time
fn unwrap_json_string(value: Value) -> Result<Value, serde_json::Error> {
    match value {
        Value::String(inner) => serde_json::from_str(&inner),
        other => Ok(other),
    }
}
