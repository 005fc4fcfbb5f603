use crate::command_view::describe_failure;
use crate::{fail, rest, Verbosity};
use serde_json::Value;

pub fn command_vote(matches: &clap::ArgMatches, uri: &str, verbosity: Verbosity) {
    let key = matches
        .value_of("KEY")
        .unwrap_or_else(|| fail("vote", "key required"));
    let option = parse_option(
        matches
            .value_of("OPTION")
            .unwrap_or_else(|| fail("vote", "option required")),
    );
    if verbosity >= Verbosity::Info {
        println!("Voting for {}", option);
    }

    let reply = rest::cast_vote(uri, key, &option).unwrap_or_else(|e| fail("vote", e));
    if !reply.is_success() {
        fail("vote", describe_failure(&reply));
    }

    match reply.body.get("response").and_then(Value::as_str) {
        Some(log) => println!("{}", log),
        None => fail("vote", "unexpected response"),
    }
}

/// Options that parse as JSON (numbers, objects) are sent as-is, anything else as a string
pub fn parse_option(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}
