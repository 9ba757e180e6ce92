use anyhow::Context;
use serde_json::Value;

use crate::check::{Check, CheckResult, Checker, CheckerMeta};

use super::group_thousands;

#[derive(Default)]
pub(crate) struct MempoolInfoRpc {
    size: Option<u64>,
    bytes: Option<u64>,
    usage: Option<u64>,
    max_mempool: Option<u64>,
    retrieved: bool,
}

#[async_trait::async_trait]
impl Checker for MempoolInfoRpc {
    fn meta(&self) -> CheckerMeta {
        CheckerMeta {
            id: "mempool-info-rpc",
            name: "Mempool Info RPC",
            description: "getmempoolinfo RPC works",
        }
    }

    async fn execute(&mut self, check: &mut Check) -> CheckResult {
        self.inner_execute(check)
            .await
            .unwrap_or_else(CheckResult::Failed)
    }

    fn additional_info(&self) -> Vec<String> {
        if !self.retrieved {
            return vec![];
        }

        vec![
            format!("Transactions in mempool: {}", self.size.unwrap_or_default()),
            format!(
                "Mempool size (bytes): {}",
                group_thousands(self.bytes.unwrap_or_default())
            ),
            format!(
                "Mempool usage (bytes): {}",
                group_thousands(self.usage.unwrap_or_default())
            ),
            format!(
                "Max mempool (bytes): {}",
                group_thousands(self.max_mempool.unwrap_or_default())
            ),
        ]
    }
}

impl MempoolInfoRpc {
    async fn inner_execute(&mut self, check: &mut Check) -> anyhow::Result<CheckResult> {
        let info = check
            .client()
            .rpc("getmempoolinfo", &[])
            .await
            .context("getmempoolinfo failed")?;

        self.retrieved = true;
        self.size = info.get("size").and_then(Value::as_u64);
        self.bytes = info.get("bytes").and_then(Value::as_u64);
        self.usage = info.get("usage").and_then(Value::as_u64);
        self.max_mempool = info.get("maxmempool").and_then(Value::as_u64);

        Ok(CheckResult::Ok)
    }
}
