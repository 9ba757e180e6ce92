use anyhow::Context;
use serde_json::Value;

use crate::check::{Check, CheckResult, Checker, CheckerMeta};

use super::field_to_string;

#[derive(Default)]
pub(crate) struct RpcConnection {
    connected: Option<bool>,
    chain: Option<String>,
    blocks: Option<u64>,
    headers: Option<u64>,
}

#[async_trait::async_trait]
impl Checker for RpcConnection {
    fn meta(&self) -> CheckerMeta {
        CheckerMeta {
            id: "rpc-connection",
            name: "RPC Connection",
            description: "RPC interface accepts the configured credentials",
        }
    }

    async fn execute(&mut self, check: &mut Check) -> CheckResult {
        self.inner_execute(check)
            .await
            .unwrap_or_else(CheckResult::Fatal)
    }

    fn additional_info(&self) -> Vec<String> {
        match self.connected {
            Some(true) => vec![
                format!("Network: {}", self.chain.as_deref().unwrap_or("unknown")),
                format!("Blocks: {}", self.blocks.unwrap_or_default()),
                format!("Headers: {}", self.headers.unwrap_or_default()),
            ],
            Some(false) => vec![
                "Cannot proceed without RPC connection. Please check:".to_owned(),
                "  1. Bitcoin Core is running".to_owned(),
                "  2. RPC credentials are correct".to_owned(),
                "  3. server=1 is set in bitcoin.conf".to_owned(),
                "  4. Host and port are correct".to_owned(),
            ],
            None => vec![],
        }
    }
}

impl RpcConnection {
    async fn inner_execute(&mut self, check: &mut Check) -> anyhow::Result<CheckResult> {
        self.connected = Some(false);

        let info = check
            .client()
            .rpc("getblockchaininfo", &[])
            .await
            .context("RPC connection failed")?;

        self.connected = Some(true);
        self.chain = field_to_string(&info, "chain");
        self.blocks = info.get("blocks").and_then(Value::as_u64);
        self.headers = info.get("headers").and_then(Value::as_u64);

        Ok(CheckResult::Ok)
    }
}
