use std::fmt;
use std::time::Duration;

use hyper::body::{self, Bytes};
use hyper::client::HttpConnector;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Client, Request, StatusCode};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a single RPC or REST request. `Ok` holds the decoded payload.
pub type RequestOutcome = Result<Value, RequestError>;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("could not serialize request")]
    SerializeRequestBody(#[source] serde_json::Error),

    #[error("could not construct request")]
    ConstructRequest(#[source] hyper::http::Error),

    #[error("could not make HTTP request: {0}")]
    Transport(hyper::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("could not read response: {0}")]
    ReadResponse(hyper::Error),

    #[error("response has status code {}{}", .0, describe_body(.1))]
    UnsuccessfulResponse(StatusCode, String),

    #[error("could not deserialize response")]
    ParseResponseBody(#[source] serde_json::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl RequestError {
    /// Numeric diagnostic code: the HTTP status for HTTP-level failures, the
    /// node's own code for RPC errors, and -1 for everything else.
    pub fn code(&self) -> i64 {
        match self {
            RequestError::UnsuccessfulResponse(status, _) => i64::from(status.as_u16()),
            RequestError::Rpc { code, .. } => *code,
            _ => -1,
        }
    }

    fn from_rpc_error(error: &Value) -> Self {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(-1);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), ToOwned::to_owned);
        RequestError::Rpc { code, message }
    }
}

fn describe_body(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(" and body {}", body)
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'a str,
    params: &'a [Value],
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Value,
}

/// Connection parameters for one node, fixed for the lifetime of a run.
#[derive(Clone)]
pub struct NodeClient {
    authority: String,
    username: String,
    password: String,
    timeout: Duration,
}

impl NodeClient {
    pub fn new(
        host: &str,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, Error> {
        let host = host.trim();
        if host.is_empty() {
            return Err(Error::BadHostParameter(host.to_owned()));
        }

        let authority = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, port)
        } else {
            format!("{}:{}", host, port)
        };
        format!("http://{}/", authority)
            .parse::<hyper::Uri>()
            .map_err(|_| Error::BadHostParameter(host.to_owned()))?;

        Ok(NodeClient {
            authority,
            username: username.into(),
            password: password.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `host:port` as used in request URIs.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn rpc(&self, method: &str, params: &[Value]) -> RequestOutcome {
        let body = serde_json::to_vec(&RpcRequest {
            jsonrpc: "2.0",
            id: "test",
            method,
            params,
        })
        .map_err(RequestError::SerializeRequestBody)?;

        let credentials = base64::encode(format!("{}:{}", self.username, self.password));
        let req = Request::post(format!("http://{}/", self.authority))
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Basic {}", credentials))
            .body(Body::from(body))
            .map_err(RequestError::ConstructRequest)?;

        debug!("POST http://{}/ method={}", self.authority, method);
        let body = self.send(req).await?;

        let response: RpcResponse =
            serde_json::from_slice(&body).map_err(RequestError::ParseResponseBody)?;
        if !response.error.is_null() {
            return Err(RequestError::from_rpc_error(&response.error));
        }

        Ok(response.result)
    }

    pub async fn rest(&self, endpoint: &str) -> RequestOutcome {
        let uri = format!(
            "http://{}/rest/{}",
            self.authority,
            endpoint.trim_start_matches('/')
        );
        let req = Request::get(&uri)
            .body(Body::empty())
            .map_err(RequestError::ConstructRequest)?;

        debug!("GET {}", uri);
        let body = self.send(req).await?;

        serde_json::from_slice(&body).map_err(RequestError::ParseResponseBody)
    }

    async fn send(&self, req: Request<Body>) -> Result<Bytes, RequestError> {
        let client: Client<HttpConnector, Body> =
            Client::builder().pool_max_idle_per_host(0).build_http();

        let exchange = async {
            let res = client.request(req).await.map_err(RequestError::Transport)?;

            let status = res.status();
            let body = body::to_bytes(res.into_body())
                .await
                .map_err(RequestError::ReadResponse)?;
            debug!("response status {} ({} bytes)", status, body.len());

            if !status.is_success() {
                return Err(RequestError::UnsuccessfulResponse(
                    status,
                    String::from_utf8_lossy(&body).into_owned(),
                ));
            }

            Ok(body)
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| RequestError::Timeout(self.timeout))?
    }
}

impl fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeClient")
            .field("authority", &self.authority)
            .field("username", &self.username)
            .field("password", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::time::Duration;

    use matches::assert_matches;
    use mockito::{mock, Matcher};
    use serde_json::json;

    use super::{NodeClient, RequestError};

    fn client() -> NodeClient {
        let addr = mockito::server_address();
        NodeClient::new(&addr.ip().to_string(), addr.port(), "user", "pass").unwrap()
    }

    #[tokio::test]
    async fn rpc_sends_envelope_with_basic_auth() {
        let _m = mock("POST", "/")
            .match_header("authorization", "Basic dXNlcjpwYXNz")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "jsonrpc": "2.0",
                "id": "test",
                "method": "getblockchaininfo",
                "params": [],
            })))
            .with_status(200)
            .with_body(r#"{"result":{"chain":"main","blocks":800000},"error":null,"id":"test"}"#)
            .create();

        let result = client().rpc("getblockchaininfo", &[]).await.unwrap();

        assert_eq!(result["chain"], "main");
        assert_eq!(result["blocks"], 800_000);
    }

    #[tokio::test]
    async fn rpc_passes_positional_params() {
        let _m = mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "getblockhash",
                "params": [0],
            })))
            .with_status(200)
            .with_body(r#"{"result":"000000000019d6","error":null,"id":"test"}"#)
            .create();

        let result = client().rpc("getblockhash", &[json!(0)]).await.unwrap();

        assert_eq!(result, "000000000019d6");
    }

    #[tokio::test]
    async fn rpc_missing_result_is_null() {
        let _m = mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"id":"test"}"#)
            .create();

        let result = client().rpc("getzmqnotifications", &[]).await.unwrap();

        assert!(result.is_null());
    }

    #[tokio::test]
    async fn rpc_error_object_is_failure() {
        let _m = mock("POST", "/")
            .with_status(200)
            .with_body(
                r#"{"result":null,"error":{"code":-32601,"message":"Method not found"},"id":"test"}"#,
            )
            .create();

        let err = client().rpc("getindexinfo", &[]).await.unwrap_err();

        assert_eq!(err.code(), -32601);
        assert_eq!(err.to_string(), "RPC error -32601: Method not found");
    }

    #[tokio::test]
    async fn rpc_error_without_fields_keeps_raw_value() {
        let _m = mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"result":null,"error":"warming up","id":"test"}"#)
            .create();

        let err = client().rpc("getblockchaininfo", &[]).await.unwrap_err();

        assert_eq!(err.code(), -1);
        assert_matches!(err, RequestError::Rpc { ref message, .. } if message.as_str() == "\"warming up\"");
    }

    #[tokio::test]
    async fn http_status_failure_carries_status_code() {
        let _m = mock("POST", "/").with_status(401).create();

        let err = client().rpc("getblockchaininfo", &[]).await.unwrap_err();

        assert_matches!(err, RequestError::UnsuccessfulResponse(..));
        assert_eq!(err.code(), 401);
    }

    #[tokio::test]
    async fn malformed_json_is_failure() {
        let _m = mock("GET", "/rest/chaininfo.json")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create();

        let err = client().rest("chaininfo.json").await.unwrap_err();

        assert_matches!(err, RequestError::ParseResponseBody(_));
        assert_eq!(err.code(), -1);
    }

    #[tokio::test]
    async fn rest_is_unauthenticated_get() {
        let _m = mock("GET", "/rest/mempool/info.json")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"loaded":true,"size":12}"#)
            .create();

        let result = client().rest("mempool/info.json").await.unwrap();

        assert_eq!(result["size"], 12);
    }

    #[tokio::test]
    async fn connection_refused_is_transport_failure() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = NodeClient::new("127.0.0.1", port, "user", "pass").unwrap();

        let err = client.rpc("getblockchaininfo", &[]).await.unwrap_err();

        assert_matches!(err, RequestError::Transport(_));
        assert_eq!(err.code(), -1);
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let client = NodeClient::new("127.0.0.1", port, "user", "pass")
            .unwrap()
            .with_timeout(Duration::from_millis(200));

        let err = client.rest("chaininfo.json").await.unwrap_err();

        assert_matches!(err, RequestError::Timeout(_));
        assert_eq!(err.code(), -1);
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        let client = NodeClient::new("::1", 8332, "user", "pass").unwrap();
        assert_eq!(client.authority(), "[::1]:8332");
    }

    #[test]
    fn empty_host_is_rejected() {
        assert!(NodeClient::new("  ", 8332, "user", "pass").is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let client = NodeClient::new("127.0.0.1", 8332, "user", "hunter2").unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }
}
