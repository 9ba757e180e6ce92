use anyhow::Context;

use crate::check::{Check, CheckResult, Checker, CheckerMeta};

use super::field_to_string;

#[derive(Default)]
pub(crate) struct RestChainInfo {
    reachable: Option<bool>,
    chain: Option<String>,
}

#[async_trait::async_trait]
impl Checker for RestChainInfo {
    fn meta(&self) -> CheckerMeta {
        CheckerMeta {
            id: "rest-chain-info",
            name: "REST API",
            description: "REST API is accessible",
        }
    }

    async fn execute(&mut self, check: &mut Check) -> CheckResult {
        self.inner_execute(check)
            .await
            .unwrap_or_else(CheckResult::Failed)
    }

    fn additional_info(&self) -> Vec<String> {
        match self.reachable {
            Some(true) => vec![format!(
                "Chain: {}",
                self.chain.as_deref().unwrap_or("unknown")
            )],
            Some(false) => vec!["Enable REST with 'rest=1' in bitcoin.conf".to_owned()],
            None => vec![],
        }
    }
}

impl RestChainInfo {
    async fn inner_execute(&mut self, check: &mut Check) -> anyhow::Result<CheckResult> {
        self.reachable = Some(false);

        let info = check
            .client()
            .rest("chaininfo.json")
            .await
            .context("REST API failed")?;

        self.reachable = Some(true);
        self.chain = field_to_string(&info, "chain");

        Ok(CheckResult::Ok)
    }
}
