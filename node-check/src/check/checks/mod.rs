mod mempool_info;
mod mempool_rest;
mod network_info;
mod rest_chain_info;
mod rpc_connection;
mod transaction_index;
mod zmq_notifications;

pub(crate) use self::mempool_info::MempoolInfoRpc;
pub(crate) use self::mempool_rest::MempoolRest;
pub(crate) use self::network_info::NetworkInfo;
pub(crate) use self::rest_chain_info::RestChainInfo;
pub(crate) use self::rpc_connection::RpcConnection;
pub(crate) use self::transaction_index::TransactionIndex;
pub(crate) use self::zmq_notifications::ZmqNotifications;

use serde_json::Value;

use crate::check::Checker;

pub(crate) fn built_in_checks() -> Vec<(&'static str, Vec<Box<dyn Checker>>)> {
    // RPC Connection must run first. Every later check assumes the node is reachable.
    let rpc_connection: Vec<Box<dyn Checker>> = vec![Box::new(RpcConnection::default())];
    let rest_api: Vec<Box<dyn Checker>> = vec![Box::new(RestChainInfo::default())];
    let mempool: Vec<Box<dyn Checker>> = vec![
        Box::new(MempoolInfoRpc::default()),
        Box::new(MempoolRest::default()),
    ];
    let transaction_index: Vec<Box<dyn Checker>> = vec![Box::new(TransactionIndex::default())];
    let zmq: Vec<Box<dyn Checker>> = vec![Box::new(ZmqNotifications::default())];
    let network: Vec<Box<dyn Checker>> = vec![Box::new(NetworkInfo::default())];

    vec![
        ("RPC Connection", rpc_connection),
        ("REST API", rest_api),
        ("Mempool", mempool),
        ("Transaction Index", transaction_index),
        ("ZMQ Configuration", zmq),
        ("Network Information", network),
    ]
}

/// Renders a scalar field for display. Strings are shown without quotes.
fn field_to_string(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Formats a byte count with comma thousands separators, e.g. `300000000` as `300,000,000`.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
