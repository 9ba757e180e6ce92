use anyhow::Context;

use crate::check::{Check, CheckResult, Checker, CheckerMeta};

#[derive(Default)]
pub(crate) struct MempoolRest {}

#[async_trait::async_trait]
impl Checker for MempoolRest {
    fn meta(&self) -> CheckerMeta {
        CheckerMeta {
            id: "mempool-rest",
            name: "Mempool REST",
            description: "REST mempool/info endpoint works",
        }
    }

    async fn execute(&mut self, check: &mut Check) -> CheckResult {
        Self::inner_execute(check)
            .await
            .unwrap_or_else(CheckResult::Failed)
    }
}

impl MempoolRest {
    async fn inner_execute(check: &mut Check) -> anyhow::Result<CheckResult> {
        check
            .client()
            .rest("mempool/info.json")
            .await
            .context("REST mempool endpoint failed")?;

        Ok(CheckResult::Ok)
    }
}
