use reqwest::StatusCode;
use serde_json::{json, Value};

/// A decoded relay response. Failures still carry a JSON body.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The `response.error` message of a failed call, if the relay sent one
    pub fn error_message(&self) -> Option<&str> {
        self.body
            .get("response")
            .and_then(|response| response.get("error"))
            .or_else(|| self.body.get("error"))
            .and_then(Value::as_str)
    }
}

fn read(res: reqwest::blocking::Response) -> Result<Reply, reqwest::Error> {
    let status = res.status();
    let body = res.json()?;
    Ok(Reply { status, body })
}

pub fn get(base_uri: &str, path: &str) -> Result<Reply, reqwest::Error> {
    let full_uri = format!("{}{}", base_uri, path);
    let client = reqwest::blocking::Client::new();
    read(client.get(&full_uri).send()?)
}

pub fn post(base_uri: &str, path: &str, body: &Value) -> Result<Reply, reqwest::Error> {
    let full_uri = format!("{}{}", base_uri, path);
    let client = reqwest::blocking::Client::new();
    read(client.post(&full_uri).json(body).send()?)
}

pub fn health(base_uri: &str) -> Result<Reply, reqwest::Error> {
    get(base_uri, "/health")
}

pub fn voting_options(base_uri: &str) -> Result<Reply, reqwest::Error> {
    get(base_uri, "/viewVotingOptions")
}

pub fn time_limits(base_uri: &str) -> Result<Reply, reqwest::Error> {
    get(base_uri, "/viewTimeLimits")
}

pub fn add_key(base_uri: &str, key: &str) -> Result<Reply, reqwest::Error> {
    post(base_uri, "/addkey", &json!({ "key": key }))
}

pub fn admin_flush(base_uri: &str, admin_key: &str) -> Result<Reply, reqwest::Error> {
    post(base_uri, "/adminAddKey", &json!({ "adminAPIKey": admin_key }))
}

pub fn cast_vote(base_uri: &str, key: &str, option: &Value) -> Result<Reply, reqwest::Error> {
    post(
        base_uri,
        "/castVote",
        &json!({ "key": key, "voting_option": option }),
    )
}
