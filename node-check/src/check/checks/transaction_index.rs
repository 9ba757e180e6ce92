use anyhow::{anyhow, Context};
use serde_json::Value;

use crate::check::{Check, CheckResult, Checker, CheckerMeta};

use super::field_to_string;

#[derive(Default)]
pub(crate) struct TransactionIndex {
    state: Option<IndexState>,
    best_block_height: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IndexState {
    Disabled,
    Syncing,
    Synced,
}

#[async_trait::async_trait]
impl Checker for TransactionIndex {
    fn meta(&self) -> CheckerMeta {
        CheckerMeta {
            id: "transaction-index",
            name: "Transaction Index",
            description: "transaction index is enabled and synced",
        }
    }

    async fn execute(&mut self, check: &mut Check) -> CheckResult {
        self.inner_execute(check)
            .await
            .unwrap_or_else(CheckResult::Failed)
    }

    fn additional_info(&self) -> Vec<String> {
        match self.state {
            Some(IndexState::Synced) => vec![format!(
                "Best block height: {}",
                self.best_block_height.as_deref().unwrap_or("N/A")
            )],
            Some(IndexState::Syncing) => vec![format!(
                "Progress: {} blocks indexed",
                self.best_block_height.as_deref().unwrap_or("0")
            )],
            Some(IndexState::Disabled) => vec![
                "Enable with 'txindex=1' in bitcoin.conf and restart with -reindex".to_owned(),
            ],
            None => vec![],
        }
    }
}

impl TransactionIndex {
    async fn inner_execute(&mut self, check: &mut Check) -> anyhow::Result<CheckResult> {
        let indexes = check
            .client()
            .rpc("getindexinfo", &[])
            .await
            .context("Could not check transaction index")?;

        let txindex = if let Some(txindex) = indexes.get("txindex") {
            txindex
        } else {
            self.state = Some(IndexState::Disabled);
            return Ok(CheckResult::Failed(anyhow!(
                "Transaction index is not enabled"
            )));
        };

        self.best_block_height = field_to_string(txindex, "best_block_height");

        if txindex.get("synced").and_then(Value::as_bool).unwrap_or(false) {
            self.state = Some(IndexState::Synced);
            Ok(CheckResult::Ok)
        } else {
            self.state = Some(IndexState::Syncing);
            Ok(CheckResult::Warning(anyhow!(
                "Transaction index is enabled but still syncing"
            )))
        }
    }
}
