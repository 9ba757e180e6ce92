// Copyright (c) Microsoft. All rights reserved.

#![deny(rust_2018_idioms)]
#![deny(clippy::all, clippy::pedantic)]

use std::collections::BTreeSet;
use std::num::NonZeroU64;
use std::process;
use std::time::Duration;

use clap::{crate_description, crate_name, crate_version, App, Arg};
use log::LevelFilter;

use node_check::{Check, Error, NodeClient, Output};

fn main() {
    match run() {
        Ok(()) => (),
        Err(Error::Diagnostics) => process::exit(1),
        Err(error) => {
            eprintln!("{}", error);

            let mut cause = std::error::Error::source(&error);
            while let Some(err) = cause {
                eprintln!("\tcaused by: {}", err);
                cause = err.source();
            }

            eprintln!();

            process::exit(1);
        }
    }
}

fn run() -> Result<(), Error> {
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .after_help(
            "EXAMPLES:\n    \
             node-check --user mempool --password mypassword\n    \
             node-check --host 192.168.1.100 --port 8332 --user mempool --password mypassword",
        )
        .arg(
            Arg::with_name("host")
                .help("Bitcoin Core RPC host")
                .short("H")
                .long("host")
                .takes_value(true)
                .value_name("HOST")
                .env("BITCOIN_RPC_HOST")
                .default_value("127.0.0.1"),
        )
        .arg(
            Arg::with_name("port")
                .help("Bitcoin Core RPC port")
                .short("p")
                .long("port")
                .takes_value(true)
                .value_name("PORT")
                .env("BITCOIN_RPC_PORT")
                .default_value("8332"),
        )
        .arg(
            Arg::with_name("user")
                .help("Bitcoin Core RPC username")
                .short("u")
                .long("user")
                .takes_value(true)
                .value_name("USER")
                .env("BITCOIN_RPC_USER")
                .required_unless("list"),
        )
        .arg(
            Arg::with_name("password")
                .help("Bitcoin Core RPC password")
                .short("P")
                .long("password")
                .takes_value(true)
                .value_name("PASSWORD")
                .env("BITCOIN_RPC_PASSWORD")
                .hide_env_values(true)
                .required_unless("list"),
        )
        .arg(
            Arg::with_name("timeout")
                .help("Seconds to wait for each request before failing it. Must be at least 1.")
                .long("timeout")
                .takes_value(true)
                .value_name("SECONDS")
                .env("NODE_CHECK_TIMEOUT")
                .default_value("10"),
        )
        .arg(
            Arg::with_name("dont-run")
                .help("Space-separated list of check IDs which should be skipped. See --list for a list of check IDs. rpc-connection always runs.")
                .long("dont-run")
                .takes_value(true)
                .value_name("DONT_RUN")
                .value_delimiter(" "),
        )
        .arg(
            Arg::with_name("verbose")
                .help("Increases verbosity of output.")
                .long("verbose")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("list")
                .help("List the checks that are run and exit.")
                .long("list")
                .takes_value(false),
        )
        .get_matches();

    let verbose = matches.is_present("verbose");

    env_logger::Builder::new()
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .parse_env("RUST_LOG")
        .init();

    if matches.is_present("list") {
        return Check::print_list();
    }

    let port = matches
        .value_of("port")
        .expect("arg has a default value")
        .parse::<u16>()
        .map_err(Error::BadPortParameter)?;
    let timeout = parse_timeout(
        matches
            .value_of("timeout")
            .expect("arg has a default value"),
    )?;

    let client = NodeClient::new(
        matches.value_of("host").expect("arg has a default value"),
        port,
        matches.value_of("user").expect("arg is required"),
        matches.value_of("password").expect("arg is required"),
    )?
    .with_timeout(timeout);

    let dont_run: BTreeSet<String> = matches
        .values_of("dont-run")
        .map(|values| values.map(ToOwned::to_owned).collect())
        .unwrap_or_default();

    let runtime = tokio::runtime::Runtime::new().map_err(Error::InitializeTokio)?;

    let mut check = Check::new(client, dont_run, verbose, Output::Stdout);
    let report = runtime.block_on(check.execute())?;

    if report.all_passed() {
        Ok(())
    } else {
        Err(Error::Diagnostics)
    }
}

/// Request timeout in whole seconds. Zero would expire every request before it is sent.
fn parse_timeout(value: &str) -> Result<Duration, Error> {
    let secs = value
        .parse::<NonZeroU64>()
        .map_err(Error::BadTimeoutParameter)?;
    Ok(Duration::from_secs(secs.get()))
}
