// Copyright (c) Microsoft. All rights reserved.

use std::collections::BTreeSet;
use std::io::Write;

use log::debug;

use crate::client::NodeClient;
use crate::error::Error;

mod checks;

mod shared;
pub use self::shared::{CheckResult, Checker, CheckerMeta};

mod stdout;
use self::stdout::Stdout;

mod summary;
pub use self::summary::{Summary, ALL_PASSED_MESSAGE, SOME_FAILED_MESSAGE};

const BANNER_WIDTH: usize = 70;

/// The connectivity gate. Always runs, even when listed in `dont_run`.
const RPC_CONNECTION_CHECK_ID: &str = "rpc-connection";

/// Where the report is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    /// Standard output, colored when it is a terminal.
    Stdout,

    /// An in-memory buffer, returned in the `CheckReport`.
    Captured,
}

pub struct Check {
    client: NodeClient,
    dont_run: BTreeSet<String>,
    verbose: bool,
    output: Output,
}

/// Outcome of one run: the (check name, passed) pairs in the order the checks ran.
#[derive(Debug)]
pub struct CheckReport {
    results: Vec<(&'static str, bool)>,
    aborted: bool,
    transcript: Option<String>,
}

impl CheckReport {
    pub fn results(&self) -> &[(&'static str, bool)] {
        &self.results
    }

    /// Whether a fatal check stopped the run before the remaining checks.
    pub fn aborted(&self) -> bool {
        self.aborted
    }

    pub fn summary(&self) -> Summary {
        Summary::new(&self.results)
    }

    /// A run that executed no checks has not verified anything, so it does not pass.
    pub fn all_passed(&self) -> bool {
        !self.aborted && !self.results.is_empty() && self.summary().all_passed()
    }

    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }

    /// The rendered report, when the run used `Output::Captured`.
    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }
}

impl Check {
    pub fn new(
        client: NodeClient,
        dont_run: BTreeSet<String>,
        verbose: bool,
        output: Output,
    ) -> Check {
        Check {
            client,
            dont_run,
            verbose,
            output,
        }
    }

    pub fn client(&self) -> &NodeClient {
        &self.client
    }

    fn should_skip(&self, check_id: &str) -> bool {
        check_id != RPC_CONNECTION_CHECK_ID && self.dont_run.contains(check_id)
    }

    pub fn print_list() -> Result<(), Error> {
        let all_checks: Vec<(&'static str, Vec<CheckerMeta>)> = checks::built_in_checks()
            .into_iter()
            .map(|(section_name, section_checks)| {
                (
                    section_name,
                    section_checks.iter().map(|check| check.meta()).collect(),
                )
            })
            .collect();

        // All our text is ASCII, so we can measure text width in bytes rather than counting graphemes.
        let section_name_column_width = all_checks
            .iter()
            .map(|(section_name, _)| section_name.len())
            .max()
            .unwrap_or_default()
            + 1;
        let check_id_column_width = all_checks
            .iter()
            .flat_map(|(_, section_checks)| section_checks)
            .map(|check_meta| check_meta.id.len())
            .max()
            .unwrap_or_default()
            + 1;

        let stdout = std::io::stdout();
        let mut stdout = stdout.lock();

        writeln!(
            stdout,
            "{:section_name_column_width$}{:check_id_column_width$}DESCRIPTION",
            "CATEGORY",
            "ID",
            section_name_column_width = section_name_column_width,
            check_id_column_width = check_id_column_width,
        )
        .map_err(Error::WriteToStdout)?;
        writeln!(stdout).map_err(Error::WriteToStdout)?;

        for (section_name, section_checks) in all_checks {
            for check_meta in section_checks {
                writeln!(
                    stdout,
                    "{:section_name_column_width$}{:check_id_column_width$}{}",
                    section_name,
                    check_meta.id,
                    check_meta.description,
                    section_name_column_width = section_name_column_width,
                    check_id_column_width = check_id_column_width,
                )
                .map_err(Error::WriteToStdout)?;
            }

            writeln!(stdout).map_err(Error::WriteToStdout)?;
        }

        Ok(())
    }

    pub async fn execute(&mut self) -> Result<CheckReport, Error> {
        let mut stdout = Stdout::new(self.output);
        let mut results = Vec::new();
        let mut aborted = false;

        write_banner(&mut stdout, "Bitcoin Core & mempool.space Integration Test")
            .map_err(Error::WriteToStdout)?;
        stdout
            .write_plain(|stdout| {
                writeln!(stdout, "  Testing connection to {}", self.client.authority())?;
                writeln!(stdout, "  RPC User: {}", self.client.username())
            })
            .map_err(Error::WriteToStdout)?;

        'outer: for (section_name, section_checks) in checks::built_in_checks() {
            if section_checks
                .iter()
                .all(|check| self.should_skip(check.meta().id))
            {
                continue;
            }

            write_banner(&mut stdout, section_name).map_err(Error::WriteToStdout)?;

            for mut check in section_checks {
                let meta = check.meta();

                let check_result = if self.should_skip(meta.id) {
                    CheckResult::Ignored
                } else {
                    check.execute(self).await
                };
                debug!("check {} resolved to {:?}", meta.id, check_result);

                if let CheckResult::Ignored = check_result {
                    continue;
                }

                results.push((meta.name, check_result.passed()));

                output_check(
                    &mut stdout,
                    &meta,
                    &check_result,
                    &check.additional_info(),
                    self.verbose,
                )
                .map_err(Error::WriteToStdout)?;

                if let CheckResult::Fatal(_) = check_result {
                    aborted = true;
                    break 'outer;
                }
            }
        }

        if !aborted {
            summary::write_summary(&mut stdout, &results).map_err(Error::WriteToStdout)?;
        }

        Ok(CheckReport {
            results,
            aborted,
            transcript: stdout.captured(),
        })
    }
}

fn output_check(
    stdout: &mut Stdout,
    meta: &CheckerMeta,
    check_result: &CheckResult,
    additional_info: &[String],
    verbose: bool,
) -> std::io::Result<()> {
    match check_result {
        CheckResult::Ok => {
            stdout.write_success(|stdout| writeln!(stdout, "\u{221a} {} - OK", meta.description))?;
        }

        CheckResult::Warning(warning) => {
            stdout.write_warning(|stdout| {
                writeln!(stdout, "\u{203c} {} - Warning", meta.description)?;
                write_error_chain(stdout, warning, verbose)
            })?;
        }

        CheckResult::Failed(err) | CheckResult::Fatal(err) => {
            stdout.write_error(|stdout| {
                writeln!(stdout, "\u{00d7} {} - Error", meta.description)?;
                write_error_chain(stdout, err, verbose)
            })?;
        }

        CheckResult::Ignored => (),
    }

    stdout.write_plain(|stdout| {
        for line in additional_info {
            writeln!(stdout, "    {}", line)?;
        }
        Ok(())
    })
}

fn write_error_chain(
    stdout: &mut dyn Write,
    err: &anyhow::Error,
    verbose: bool,
) -> std::io::Result<()> {
    if !verbose {
        let message = format!("{:#}", err);
        return write_lines(stdout, "    ", "    ", message.lines());
    }

    let message = err.to_string();
    write_lines(stdout, "    ", "    ", message.lines())?;

    for cause in err.chain().skip(1) {
        write_lines(
            stdout,
            "        caused by: ",
            "                   ",
            cause.to_string().lines(),
        )?;
    }

    Ok(())
}

fn write_banner(stdout: &mut Stdout, title: &str) -> std::io::Result<()> {
    stdout.write_header(|stdout| {
        writeln!(stdout)?;
        writeln!(stdout, "{}", "=".repeat(BANNER_WIDTH))?;
        writeln!(stdout, "{:^width$}", title, width = BANNER_WIDTH)?;
        writeln!(stdout, "{}", "=".repeat(BANNER_WIDTH))?;
        writeln!(stdout)
    })
}

fn write_lines<'a>(
    writer: &mut (impl Write + ?Sized),
    first_line_indent: &str,
    other_lines_indent: &str,
    mut lines: impl Iterator<Item = &'a str>,
) -> std::io::Result<()> {
    if let Some(line) = lines.next() {
        writeln!(writer, "{}{}", first_line_indent, line)?;
    }

    for line in lines {
        writeln!(writer, "{}{}", other_lines_indent, line)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use mockito::{mock, Matcher};
    use serde_json::json;

    use crate::client::NodeClient;

    use super::{Check, CheckReport, Output};

    fn check(dont_run: &[&str]) -> Check {
        let addr = mockito::server_address();
        let client = NodeClient::new(&addr.ip().to_string(), addr.port(), "user", "pass").unwrap();
        Check::new(
            client,
            dont_run.iter().map(ToString::to_string).collect::<BTreeSet<_>>(),
            false,
            Output::Captured,
        )
    }

    #[tokio::test]
    async fn dont_run_excludes_checks_from_summary() {
        let _m = mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": "getblockchaininfo" })))
            .with_status(200)
            .with_body(r#"{"result":{"chain":"regtest","blocks":0,"headers":0},"error":null}"#)
            .create();

        let mut check = check(&[
            "rest-chain-info",
            "mempool-info-rpc",
            "mempool-rest",
            "transaction-index",
            "zmq-notifications",
            "network-info",
        ]);
        let report = check.execute().await.unwrap();

        assert_eq!(report.results(), &[("RPC Connection", true)]);
        assert_eq!(report.exit_code(), 0);

        let transcript = report.transcript().unwrap();
        assert!(!transcript.contains("Transaction Index"));
        assert!(!transcript.contains("ZMQ"));
    }

    #[tokio::test]
    async fn failed_check_shows_error_chain() {
        let _m = mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": "getblockchaininfo" })))
            .with_status(200)
            .with_body(r#"{"result":{"chain":"main"},"error":null}"#)
            .create();
        let _n = mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": "getnetworkinfo" })))
            .with_status(200)
            .with_body(r#"{"result":null,"error":{"code":-28,"message":"Loading wallet..."}}"#)
            .create();

        let mut check = check(&[
            "rest-chain-info",
            "mempool-info-rpc",
            "mempool-rest",
            "transaction-index",
            "zmq-notifications",
        ]);
        let report = check.execute().await.unwrap();

        assert_eq!(
            report.results(),
            &[("RPC Connection", true), ("Network Info", false)]
        );
        assert_eq!(report.exit_code(), 1);
        assert!(report
            .transcript()
            .unwrap()
            .contains("Could not get network info: RPC error -28: Loading wallet..."));
    }

    #[tokio::test]
    async fn rpc_connection_cannot_be_skipped() {
        let _m = mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": "getblockchaininfo" })))
            .with_status(401)
            .create();

        let mut check = check(&["rpc-connection", "rest-chain-info", "network-info"]);
        let report = check.execute().await.unwrap();

        assert!(report.aborted());
        assert_eq!(report.results(), &[("RPC Connection", false)]);
        assert_eq!(report.exit_code(), 1);
    }

    #[tokio::test]
    async fn skipping_every_check_still_contacts_node() {
        let _m = mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": "getblockchaininfo" })))
            .with_status(401)
            .create();

        let mut check = check(&[
            "rpc-connection",
            "rest-chain-info",
            "mempool-info-rpc",
            "mempool-rest",
            "transaction-index",
            "zmq-notifications",
            "network-info",
        ]);
        let report = check.execute().await.unwrap();

        assert_eq!(report.results(), &[("RPC Connection", false)]);
        assert_eq!(report.exit_code(), 1);
        assert!(!report
            .transcript()
            .unwrap()
            .contains(super::ALL_PASSED_MESSAGE));
    }

    #[test]
    fn empty_run_does_not_pass() {
        let report = CheckReport {
            results: vec![],
            aborted: false,
            transcript: None,
        };

        assert!(!report.all_passed());
        assert_eq!(report.exit_code(), 1);
    }
}
