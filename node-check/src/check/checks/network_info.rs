use anyhow::Context;
use serde_json::Value;

use crate::check::{Check, CheckResult, Checker, CheckerMeta};

use super::field_to_string;

#[derive(Default)]
pub(crate) struct NetworkInfo {
    retrieved: bool,
    version: Option<String>,
    subversion: Option<String>,
    protocol_version: Option<String>,
    connections: Option<u64>,
}

#[async_trait::async_trait]
impl Checker for NetworkInfo {
    fn meta(&self) -> CheckerMeta {
        CheckerMeta {
            id: "network-info",
            name: "Network Info",
            description: "network info can be retrieved",
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
            format!("Version: {}", self.version.as_deref().unwrap_or("unknown")),
            format!(
                "Subversion: {}",
                self.subversion.as_deref().unwrap_or("unknown")
            ),
            format!(
                "Protocol version: {}",
                self.protocol_version.as_deref().unwrap_or("unknown")
            ),
            format!("Connections: {}", self.connections.unwrap_or_default()),
        ]
    }
}

impl NetworkInfo {
    async fn inner_execute(&mut self, check: &mut Check) -> anyhow::Result<CheckResult> {
        let info = check
            .client()
            .rpc("getnetworkinfo", &[])
            .await
            .context("Could not get network info")?;

        self.retrieved = true;
        self.version = field_to_string(&info, "version");
        self.subversion = field_to_string(&info, "subversion");
        self.protocol_version = field_to_string(&info, "protocolversion");
        self.connections = info.get("connections").and_then(Value::as_u64);

        Ok(CheckResult::Ok)
    }
}
