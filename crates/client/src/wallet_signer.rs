//! Digest signer that delegates signing to a wallet bridge over JSON-RPC.
//!
//! The wallet signer sends `eth_sign` requests to a wallet-provider endpoint
//! (e.g. a browser-wallet bridge or a signer proxy). Wallet providers normally
//! rewrite `eth_sign` into `personal_sign`, prefixing the payload and making
//! the signature useless for raw transaction assembly. The signer therefore
//! carries a normalization flag mirroring the wallet's, and raw signing
//! happens inside a [`RawSigningScope`] that disables the rewrite and restores
//! the previous mode when the scope ends, on every exit path.

use crate::{DigestSigner, SignerError, USER_REJECTED_CODE};
use alloy_primitives::{hex, Address, Signature, B256};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// A signing capability backed by a wallet-provider JSON-RPC endpoint.
///
/// # Example
///
/// ```ignore
/// let signer = WalletSigner::new("http://localhost:9060", address);
/// let signature = signer.sign_digest(tx_signature_hash).await?;
/// ```
#[derive(Debug)]
pub struct WalletSigner {
    client: reqwest::Client,
    endpoint: String,
    address: Address,
    /// Mirrors the wallet's `eth_sign` → `personal_sign` normalization mode.
    personal_sign: AtomicBool,
}

/// Scoped raw-signing view of a [`WalletSigner`].
///
/// While the scope is alive the wallet's personal-sign normalization is
/// disabled so `eth_sign` payloads go through untouched. Dropping the scope
/// restores the previous mode, whether the signing call succeeded or failed.
#[must_use = "raw signing mode is only disabled while the scope is held"]
pub struct RawSigningScope<'a> {
    flag: &'a AtomicBool,
    prev: bool,
}

impl<'a> RawSigningScope<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        let prev = flag.swap(false, Ordering::SeqCst);
        Self { flag, prev }
    }
}

impl Drop for RawSigningScope<'_> {
    fn drop(&mut self) {
        self.flag.store(self.prev, Ordering::SeqCst);
    }
}

impl WalletSigner {
    /// Creates a new wallet signer.
    ///
    /// # Arguments
    /// * `endpoint` - The wallet-provider JSON-RPC URL
    /// * `address` - The account the wallet holds the key for
    pub fn new(endpoint: impl Into<String>, address: Address) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            address,
            personal_sign: AtomicBool::new(true),
        }
    }

    /// Creates a new wallet signer with a custom HTTP client.
    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        address: Address,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            address,
            personal_sign: AtomicBool::new(true),
        }
    }

    /// Whether `eth_sign` payloads are currently normalized to `personal_sign`.
    pub fn personal_sign_enabled(&self) -> bool {
        self.personal_sign.load(Ordering::SeqCst)
    }

    /// Acquire a raw-signing view: normalization stays off until the returned
    /// scope is dropped.
    pub fn raw_scope(&self) -> RawSigningScope<'_> {
        RawSigningScope::enter(&self.personal_sign)
    }

    /// Send `eth_sign(address, digest)` and parse the signature.
    async fn request_signature(&self, digest: B256) -> Result<Signature, SignerError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: "eth_sign",
            params: (
                format!("{:?}", self.address).to_lowercase(),
                format!("{digest}"),
            ),
            id: 1,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| SignerError::Transport(format!("{}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(SignerError::Transport(format!(
                "wallet endpoint returned {status}: {body}"
            )));
        }

        let rpc_response: JsonRpcResponse<String> = response
            .json()
            .await
            .map_err(|e| SignerError::Transport(format!("{}", e)))?;

        match rpc_response.result {
            Some(raw) => {
                let bytes = hex::decode(&raw)
                    .map_err(|e| SignerError::InvalidSignature(format!("{}", e)))?;
                Signature::from_raw(&bytes)
                    .map_err(|e| SignerError::InvalidSignature(format!("{}", e)))
            }
            None => {
                let error = rpc_response.error.unwrap_or(JsonRpcError {
                    code: -1,
                    message: "unknown error".to_string(),
                });
                if error.code == USER_REJECTED_CODE {
                    return Err(SignerError::Declined);
                }
                Err(SignerError::Rpc {
                    code: error.code,
                    message: error.message,
                })
            }
        }
    }
}

impl DigestSigner for WalletSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_digest(&self, digest: B256) -> Result<Signature, SignerError> {
        // The scope outlives the request so normalization is restored even
        // when the request errors out.
        let _raw = self.raw_scope();
        self.request_signature(digest).await
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<T> {
    jsonrpc: &'static str,
    method: &'static str,
    params: T,
    id: u32,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const TEST_ADDRESS: Address = address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1");

    fn signature_body() -> String {
        let sig = format!("0x{}{}{}", "11".repeat(32), "22".repeat(32), "1b");
        format!(r#"{{"jsonrpc":"2.0","id":1,"result":"{sig}"}}"#)
    }

    #[test]
    fn test_raw_scope_restores_mode() {
        let signer = WalletSigner::new("http://localhost:9060", TEST_ADDRESS);
        assert!(signer.personal_sign_enabled());

        {
            let _scope = signer.raw_scope();
            assert!(!signer.personal_sign_enabled());
        }

        assert!(signer.personal_sign_enabled());
    }

    #[test]
    fn test_nested_raw_scopes_restore_in_order() {
        let signer = WalletSigner::new("http://localhost:9060", TEST_ADDRESS);

        let outer = signer.raw_scope();
        {
            let _inner = signer.raw_scope();
            assert!(!signer.personal_sign_enabled());
        }
        // Inner scope restores the mode it saw: still raw.
        assert!(!signer.personal_sign_enabled());
        drop(outer);
        assert!(signer.personal_sign_enabled());
    }

    #[tokio::test]
    async fn test_sign_digest_restores_mode_on_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(signature_body())
            .create_async()
            .await;

        let signer = WalletSigner::new(server.url(), TEST_ADDRESS);
        let result = signer.sign_digest(B256::from([0xab; 32])).await;

        assert!(result.is_ok());
        assert!(signer.personal_sign_enabled());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_sign_digest_restores_mode_on_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let signer = WalletSigner::new(server.url(), TEST_ADDRESS);
        let result = signer.sign_digest(B256::from([0xab; 32])).await;

        assert!(matches!(result, Err(SignerError::Transport(_))));
        assert!(signer.personal_sign_enabled());
    }

    #[tokio::test]
    async fn test_user_rejection_maps_to_declined() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":4001,"message":"User denied message signature"}}"#,
            )
            .create_async()
            .await;

        let signer = WalletSigner::new(server.url(), TEST_ADDRESS);
        let result = signer.sign_digest(B256::from([0xab; 32])).await;

        assert!(matches!(result, Err(SignerError::Declined)));
        assert!(signer.personal_sign_enabled());
    }

    #[tokio::test]
    async fn test_rpc_error_passes_code_through() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"locked"}}"#)
            .create_async()
            .await;

        let signer = WalletSigner::new(server.url(), TEST_ADDRESS);
        let result = signer.sign_digest(B256::from([0xab; 32])).await;

        match result {
            Err(SignerError::Rpc { code, message }) => {
                assert_eq!(code, -32000);
                assert_eq!(message, "locked");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
