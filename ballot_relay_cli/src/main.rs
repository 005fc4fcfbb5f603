use clap::{App, AppSettings, Arg, SubCommand};

mod command_key;
mod command_view;
mod command_vote;
mod rest;

use command_key::*;
use command_view::*;
use command_vote::*;

/// How much the CLI prints besides command output. Errors are always printed.
#[derive(PartialEq, PartialOrd, Copy, Clone, Debug)]
pub enum Verbosity {
    Error = 1,
    Warn = 2,
    Info = 3,
}

fn main() {
    let matches = App::new("Ballot Relay CLI")
        .version("1.0")
        .author("Patrick Hayes <patrick.d.hayes@gmail.com>")
        .about("Interacts with a ballot relay server")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("uri")
                .help("Set the relay uri - can also be set with BALLOT_RELAY_URI")
                .required(false),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::with_name("q")
                .short("q")
                .conflicts_with("v")
                .help("Only print command output and errors"),
        )
        .subcommand(SubCommand::with_name("health").about("Check that the relay is up"))
        .subcommand(SubCommand::with_name("options").about("Show the ballot and its vote counts"))
        .subcommand(
            SubCommand::with_name("time-limits").about("Show the registration and voting deadlines"),
        )
        .subcommand(
            SubCommand::with_name("add-key")
                .about("Queue an anonymous voting key for registration")
                .arg(
                    Arg::with_name("KEY")
                        .index(1)
                        .required(true)
                        .help("Voting key to register"),
                ),
        )
        .subcommand(
            SubCommand::with_name("admin-flush")
                .about("Register every queued key now")
                .arg(
                    Arg::with_name("ADMIN-KEY")
                        .index(1)
                        .required(false)
                        .help("Admin API key - can also be set with BALLOT_RELAY_ADMIN_KEY"),
                ),
        )
        .subcommand(
            SubCommand::with_name("vote")
                .about("Cast a vote with a registered key")
                .arg(
                    Arg::with_name("KEY")
                        .index(1)
                        .required(true)
                        .help("Proof key the vote is cast with"),
                )
                .arg(
                    Arg::with_name("OPTION")
                        .index(2)
                        .required(true)
                        .help("Voting option, as a name or a JSON value"),
                ),
        )
        .get_matches();

    let verbosity = verbosity(matches.occurrences_of("v"), matches.is_present("q"));

    let env_var = std::env::var("BALLOT_RELAY_URI");
    let uri = match matches.value_of("uri") {
        Some(uri) => uri,
        None => env_var.as_deref().unwrap_or("http://localhost:4692"),
    };
    let uri = uri.trim_end_matches('/');
    if verbosity >= Verbosity::Info {
        println!("URI: {}", uri);
    }

    // Subcommands
    match matches.subcommand() {
        ("health", Some(_)) => command_health(uri),
        ("options", Some(_)) => command_options(uri),
        ("time-limits", Some(_)) => command_time_limits(uri),
        ("add-key", Some(matches)) => command_add_key(matches, uri, verbosity),
        ("admin-flush", Some(matches)) => command_admin_flush(matches, uri, verbosity),
        ("vote", Some(matches)) => command_vote(matches, uri, verbosity),
        _ => unreachable!(),
    }
}

fn verbosity(verbose: u64, quiet: bool) -> Verbosity {
    match (verbose, quiet) {
        (_, true) => Verbosity::Error,
        (0, false) => Verbosity::Warn,
        _ => Verbosity::Info,
    }
}

/// Print an error and exit
pub fn fail(command: &str, message: impl std::fmt::Display) -> ! {
    eprintln!("ballot-relay {}: {}", command, message);
    std::process::exit(1);
}
