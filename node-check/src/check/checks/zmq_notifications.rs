use anyhow::anyhow;
use serde_json::Value;

use crate::check::{Check, CheckResult, Checker, CheckerMeta};

use super::field_to_string;

#[derive(Default)]
pub(crate) struct ZmqNotifications {
    state: Option<ZmqState>,
    notifications: Vec<(String, String)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ZmqState {
    Configured,
    NotConfigured,
    // getzmqnotifications does not tell a build without ZMQ apart from other failures.
    Unavailable,
}

#[async_trait::async_trait]
impl Checker for ZmqNotifications {
    fn meta(&self) -> CheckerMeta {
        CheckerMeta {
            id: "zmq-notifications",
            name: "ZMQ Configuration",
            description: "ZMQ notifications are configured",
        }
    }

    async fn execute(&mut self, check: &mut Check) -> CheckResult {
        let notifications = match check.client().rpc("getzmqnotifications", &[]).await {
            Ok(notifications) => notifications,
            Err(err) => {
                self.state = Some(ZmqState::Unavailable);
                return CheckResult::Warning(
                    anyhow::Error::new(err).context("Could not check ZMQ configuration"),
                );
            }
        };

        self.notifications = notifications
            .as_array()
            .map(|entries| entries.iter().map(describe_notification).collect())
            .unwrap_or_default();

        if self.notifications.is_empty() {
            self.state = Some(ZmqState::NotConfigured);
            CheckResult::Warning(anyhow!(
                "ZMQ is available but no notifications are configured"
            ))
        } else {
            self.state = Some(ZmqState::Configured);
            CheckResult::Ok
        }
    }

    fn additional_info(&self) -> Vec<String> {
        match self.state {
            Some(ZmqState::Configured) => self
                .notifications
                .iter()
                .map(|(kind, address)| format!("  - {}: {}", kind, address))
                .collect(),
            Some(ZmqState::NotConfigured) => vec![
                "For real-time updates, add ZMQ settings to bitcoin.conf:".to_owned(),
                "  zmqpubrawblock=tcp://127.0.0.1:28332".to_owned(),
                "  zmqpubrawtx=tcp://127.0.0.1:28333".to_owned(),
                "  zmqpubhashblock=tcp://127.0.0.1:28334".to_owned(),
            ],
            Some(ZmqState::Unavailable) => vec![
                "ZMQ support may not be compiled in this Bitcoin Core build".to_owned(),
            ],
            None => vec![],
        }
    }
}

fn describe_notification(entry: &Value) -> (String, String) {
    (
        field_to_string(entry, "type").unwrap_or_else(|| "unknown".to_owned()),
        field_to_string(entry, "address").unwrap_or_else(|| "unknown".to_owned()),
    )
}
