//! Thin JSON-RPC client for a bundler endpoint. Submission is
//! fire-and-forget: the bundler's acceptance hash is returned and on-chain
//! inclusion is not awaited.

use ethers::types::{Address, U64};
use opcast_primitives::{utils::deep_hexlify, SignedUserOperation, UserOperationHash};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

/// Bundler communication errors
#[derive(Debug, Error)]
pub enum RelayError {
    /// HTTP transport failure
    #[error("bundler transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The bundler answered with a JSON-RPC error object
    #[error("bundler rejected the request ({code}): {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// JSON-RPC error message
        message: String,
    },

    /// The response did not match the JSON-RPC envelope
    #[error("malformed bundler response: {inner}")]
    Decode {
        /// The inner error message
        inner: String,
    },
}

#[derive(Debug, Serialize)]
struct Request {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Response<R> {
    result: Option<R>,
    error: Option<ErrorObject>,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC client for a single bundler endpoint
#[derive(Clone, Debug)]
pub struct BundlerClient {
    http: reqwest::Client,
    url: String,
}

impl BundlerClient {
    pub fn new(url: String) -> Self {
        Self { http: reqwest::Client::new(), url }
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Vec<Value>,
    ) -> Result<R, RelayError> {
        let req = Request { jsonrpc: "2.0", id: 1, method, params };
        debug!(target: "opcast::relay", method, "sending bundler request");

        let res = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await?
            .json::<Response<R>>()
            .await?;

        if let Some(err) = res.error {
            return Err(RelayError::Rpc { code: err.code, message: err.message });
        }
        res.result.ok_or_else(|| RelayError::Decode {
            inner: format!("{method}: response carries neither result nor error"),
        })
    }

    /// Confirms the bundler is reachable and returns the chain id it serves
    pub async fn ping(&self) -> Result<U64, RelayError> {
        let chain_id: U64 = self.call("eth_chainId", vec![]).await?;
        info!(target: "opcast::relay", %chain_id, url = %self.url, "bundler is reachable");
        Ok(chain_id)
    }

    /// Submits a signed user operation for inclusion through the given entry
    /// point and returns the hash the bundler accepted it under
    pub async fn send_user_operation(
        &self,
        signed: &SignedUserOperation,
        entry_point: &Address,
    ) -> Result<UserOperationHash, RelayError> {
        let uo = deep_hexlify(signed.user_operation())
            .map_err(|e| RelayError::Decode { inner: e.to_string() })?;
        let ep = Value::String(format!("{entry_point:?}"));

        let hash: UserOperationHash =
            self.call("eth_sendUserOperation", vec![uo, ep]).await?;
        info!(target: "opcast::relay", user_operation_hash = ?hash, "user operation accepted");
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_envelope_shape() {
        let req = Request {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_chainId",
            params: vec![],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "eth_chainId");
        assert!(json["params"].as_array().unwrap().is_empty());
    }

    #[test]
    fn response_error_is_surfaced() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"invalid params"}}"#;
        let res: Response<U64> = serde_json::from_str(raw).unwrap();
        let err = res.error.unwrap();
        assert_eq!(err.code, -32602);
        assert_eq!(err.message, "invalid params");
    }

    #[test]
    fn response_result_is_decoded() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"result":"0x539"}"#;
        let res: Response<U64> = serde_json::from_str(raw).unwrap();
        assert_eq!(res.result.unwrap(), U64::from(1337));
    }
}
