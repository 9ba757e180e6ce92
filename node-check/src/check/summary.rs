use super::stdout::Stdout;
use super::write_banner;

pub const ALL_PASSED_MESSAGE: &str =
    "All tests passed! Your Bitcoin Core node is ready for mempool.space.";
pub const SOME_FAILED_MESSAGE: &str =
    "Some tests failed. Review the output above for recommended fixes.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn new(results: &[(&'static str, bool)]) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|(_, passed)| *passed).count();
        Summary {
            total,
            passed,
            failed: total - passed,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

pub(super) fn write_summary(
    stdout: &mut Stdout,
    results: &[(&'static str, bool)],
) -> std::io::Result<()> {
    let summary = Summary::new(results);

    write_banner(stdout, "Test Summary")?;

    stdout.write_plain(|stdout| writeln!(stdout, "Total tests: {}", summary.total))?;
    stdout.write_success(|stdout| writeln!(stdout, "\u{221a} Passed: {}", summary.passed))?;
    if summary.failed > 0 {
        stdout.write_error(|stdout| writeln!(stdout, "\u{00d7} Failed: {}", summary.failed))?;
    }

    stdout.write_plain(|stdout| {
        writeln!(stdout)?;
        writeln!(stdout, "Detailed Results:")
    })?;
    for (name, passed) in results {
        stdout.write_plain(|stdout| write!(stdout, "  "))?;
        if *passed {
            stdout.write_success(|stdout| write!(stdout, "PASS"))?;
        } else {
            stdout.write_error(|stdout| write!(stdout, "FAIL"))?;
        }
        stdout.write_plain(|stdout| writeln!(stdout, " - {}", name))?;
    }

    stdout.write_plain(|stdout| writeln!(stdout))?;
    if summary.all_passed() {
        stdout.write_success(|stdout| writeln!(stdout, "{}", ALL_PASSED_MESSAGE))
    } else {
        stdout.write_warning(|stdout| writeln!(stdout, "{}", SOME_FAILED_MESSAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::super::stdout::Stdout;
    use super::super::Output;
    use super::{write_summary, Summary, ALL_PASSED_MESSAGE, SOME_FAILED_MESSAGE};

    fn render(results: &[(&'static str, bool)]) -> String {
        let mut stdout = Stdout::new(Output::Captured);
        write_summary(&mut stdout, results).unwrap();
        stdout.captured().unwrap()
    }

    #[test]
    fn counts_passes_and_failures() {
        let results = [
            ("RPC Connection", true),
            ("REST API", false),
            ("Mempool Info RPC", true),
            ("Transaction Index", false),
        ];

        assert_eq!(
            Summary::new(&results),
            Summary {
                total: 4,
                passed: 2,
                failed: 2,
            }
        );
    }

    #[test]
    fn all_passed_report() {
        let output = render(&[("RPC Connection", true), ("REST API", true)]);

        assert!(output.contains("Total tests: 2"));
        assert!(output.contains("Passed: 2"));
        assert!(!output.contains("Failed:"));
        assert!(output.contains(ALL_PASSED_MESSAGE));
        assert!(!output.contains(SOME_FAILED_MESSAGE));
    }

    #[test]
    fn failed_report_lists_checks_in_run_order() {
        let output = render(&[
            ("RPC Connection", true),
            ("ZMQ Configuration", false),
            ("Network Info", true),
        ]);

        assert!(output.contains("Total tests: 3"));
        assert!(output.contains("Passed: 2"));
        assert!(output.contains("Failed: 1"));
        assert!(output.contains(SOME_FAILED_MESSAGE));

        let rpc = output.find("PASS - RPC Connection").unwrap();
        let zmq = output.find("FAIL - ZMQ Configuration").unwrap();
        let network = output.find("PASS - Network Info").unwrap();
        assert!(rpc < zmq && zmq < network);
    }
}
