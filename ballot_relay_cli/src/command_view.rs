use crate::rest::{self, Reply};
use crate::fail;
use serde_json::Value;

pub fn command_health(uri: &str) {
    let reply = rest::health(uri).unwrap_or_else(|e| fail("health", e));
    match reply.body.get("status").and_then(Value::as_str) {
        Some(status) if reply.is_success() => println!("{}", status),
        _ => fail("health", describe_failure(&reply)),
    }
}

pub fn command_options(uri: &str) {
    let reply = rest::voting_options(uri).unwrap_or_else(|e| fail("options", e));
    print_view("options", &reply);
}

pub fn command_time_limits(uri: &str) {
    let reply = rest::time_limits(uri).unwrap_or_else(|e| fail("time-limits", e));
    print_view("time-limits", &reply);
}

fn print_view(command: &str, reply: &Reply) {
    if !reply.is_success() {
        fail(command, describe_failure(reply));
    }

    let view = decode_view(&reply.body).unwrap_or_else(|e| fail(command, e));
    let pretty = serde_json::to_string_pretty(&view).unwrap_or_else(|e| fail(command, e));
    println!("{}", pretty);
}

/// View results arrive as a JSON document encoded in the `response` string
pub fn decode_view(body: &Value) -> Result<Value, String> {
    match body.get("response") {
        Some(Value::String(encoded)) => {
            serde_json::from_str(encoded).map_err(|e| format!("malformed view: {}", e))
        }
        Some(other) => Ok(other.clone()),
        None => Err("missing response".to_owned()),
    }
}

pub fn describe_failure(reply: &Reply) -> String {
    match reply.error_message() {
        Some(message) => format!("{} ({})", message, reply.status),
        None => format!("request failed ({})", reply.status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn decodes_encoded_view() {
        let body = json!({ "response": "[{\"name\":\"Alice\",\"vote_count\":2}]" });
        assert_eq!(
            decode_view(&body).unwrap(),
            json!([{ "name": "Alice", "vote_count": 2 }])
        );

        assert_eq!(
            decode_view(&json!({ "response": { "voteTime": 1 } })).unwrap(),
            json!({ "voteTime": 1 })
        );
        assert!(decode_view(&json!({ "response": "{oops" })).is_err());
        assert!(decode_view(&json!({})).is_err());
    }

    #[test]
    fn failure_description() {
        let reply = Reply {
            status: StatusCode::UNAUTHORIZED,
            body: json!({ "response": { "error": "Invalid API key" } }),
        };
        assert_eq!(
            describe_failure(&reply),
            "Invalid API key (401 Unauthorized)"
        );
    }
}
