use crate::check::Check;

#[derive(Debug, Copy, Clone)]
pub struct CheckerMeta {
    /// Unique human-readable identifier for the check.
    pub id: &'static str,
    /// Name the check is reported under in the summary.
    pub name: &'static str,
    /// A brief description of what this check does.
    pub description: &'static str,
}

#[async_trait::async_trait]
pub trait Checker: Send {
    fn meta(&self) -> CheckerMeta;

    async fn execute(&mut self, shared: &mut Check) -> CheckResult;

    /// Lines describing what the last `execute` observed, including any
    /// remediation hints. Printed beneath the check's result.
    fn additional_info(&self) -> Vec<String> {
        Vec::new()
    }
}

/// The various ways a check can resolve.
///
/// Only `Ok` counts as a pass.
#[derive(Debug)]
pub enum CheckResult {
    /// Check succeeded.
    Ok,

    /// Check did not pass, but the node may still be usable.
    Warning(anyhow::Error),

    /// Check was excluded by the caller and did not run. Not reported.
    Ignored,

    /// Check failed, and further checks should be performed.
    Failed(anyhow::Error),

    /// Check failed, and further checks should not be performed.
    Fatal(anyhow::Error),
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        matches!(self, CheckResult::Ok)
    }
}
