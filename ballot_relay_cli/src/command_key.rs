use crate::command_view::describe_failure;
use crate::{fail, rest, Verbosity};

pub fn command_add_key(matches: &clap::ArgMatches, uri: &str, verbosity: Verbosity) {
    let key = matches
        .value_of("KEY")
        .unwrap_or_else(|| fail("add-key", "key required"));

    let reply = rest::add_key(uri, key).unwrap_or_else(|e| fail("add-key", e));
    if !reply.is_success() {
        fail("add-key", describe_failure(&reply));
    }
    if verbosity >= Verbosity::Warn {
        println!("Key queued");
    }
}

pub fn command_admin_flush(matches: &clap::ArgMatches, uri: &str, verbosity: Verbosity) {
    let env_var = std::env::var("BALLOT_RELAY_ADMIN_KEY");
    let admin_key = match matches.value_of("ADMIN-KEY") {
        Some(key) => key,
        None => env_var.as_deref().unwrap_or_else(|_| {
            fail(
                "admin-flush",
                "provide the admin key as an argument or via BALLOT_RELAY_ADMIN_KEY",
            )
        }),
    };

    let reply = rest::admin_flush(uri, admin_key).unwrap_or_else(|e| fail("admin-flush", e));
    if !reply.is_success() {
        fail("admin-flush", describe_failure(&reply));
    }
    if verbosity >= Verbosity::Warn {
        println!("Queued keys flushed");
    }
}
