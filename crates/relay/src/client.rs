//! HTTP client for the Flashbots-style private relay.
//!
//! Requests are JSON-RPC over HTTPS, authenticated with an
//! `X-Flashbots-Signature` header: the keccak256 digest of the body, signed
//! as a personal message by an ephemeral identity generated per client. That
//! identity authenticates requests only; it never holds funds and is distinct
//! from both the user's account and the bundle's placeholder key.

use crate::{BundleSubmission, InclusionOutcome, RelayError, SignedBundle, ValidityWindow};
use alloy_primitives::{hex, keccak256, Bytes, B256};
use alloy_provider::Provider;
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use config::RelayNetwork;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Private relay client bound to one network variant.
#[derive(Debug, Clone)]
pub struct FlashbotsClient<P> {
    http: reqwest::Client,
    endpoint: String,
    auth: PrivateKeySigner,
    provider: P,
    block_time: Duration,
}

impl<P> FlashbotsClient<P>
where
    P: Provider + Clone,
{
    /// Create a client for a supported relay network with a fresh ephemeral
    /// authentication identity.
    pub fn new(network: RelayNetwork, provider: P) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: network.relay_endpoint().to_string(),
            auth: PrivateKeySigner::random(),
            provider,
            block_time: Duration::from_secs(network.block_time_secs()),
        }
    }

    /// Create a client against an arbitrary endpoint (used by tests).
    pub fn with_endpoint(endpoint: impl Into<String>, provider: P, block_time: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            auth: PrivateKeySigner::random(),
            provider,
            block_time,
        }
    }

    /// Relay request round-trip: serialize, sign the body, post, parse.
    async fn request<T, R>(&self, method: &'static str, params: T) -> Result<R, RelayError>
    where
        T: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params: [params],
            id: 1,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| RelayError::Signing(format!("{}", e)))?;
        let signature = flashbots_signature(&self.auth, body.as_bytes())?;

        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("X-Flashbots-Signature", signature)
            .body(body)
            .send()
            .await
            .map_err(|e| RelayError::Transport(format!("{}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(RelayError::Transport(format!(
                "relay returned {status}: {text}"
            )));
        }

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| RelayError::Transport(format!("{}", e)))?;

        match rpc_response.result {
            Some(result) => Ok(result),
            None => {
                let error = rpc_response.error.unwrap_or(JsonRpcError {
                    code: -1,
                    message: "unknown error".to_string(),
                });
                Err(RelayError::Rpc {
                    code: error.code,
                    message: error.message,
                })
            }
        }
    }
}

impl<P> crate::Relay for FlashbotsClient<P>
where
    P: Provider + Clone + Send + Sync,
{
    async fn simulate(&self, bundle: &SignedBundle, target_block: u64) -> Result<(), RelayError> {
        debug!(target_block, txs = bundle.txs.len(), "Simulating bundle");

        let params = CallBundleParams {
            txs: &bundle.txs,
            block_number: format!("0x{target_block:x}"),
            state_block_number: "latest",
        };

        // The relay reports simulation failures as JSON-RPC errors; carry the
        // diagnostic through unchanged.
        match self.request::<_, serde_json::Value>("eth_callBundle", params).await {
            Ok(_) => Ok(()),
            Err(RelayError::Rpc { code, message }) => {
                Err(RelayError::Simulation { code, message })
            }
            Err(other) => Err(other),
        }
    }

    async fn send_bundle(
        &self,
        bundle: &SignedBundle,
        target_block: u64,
        window: ValidityWindow,
    ) -> Result<BundleSubmission, RelayError> {
        debug!(
            target_block,
            min_timestamp = window.min_timestamp,
            max_timestamp = window.max_timestamp,
            "Submitting bundle to relay"
        );

        let params = SendBundleParams {
            txs: &bundle.txs,
            block_number: format!("0x{target_block:x}"),
            min_timestamp: window.min_timestamp,
            max_timestamp: window.max_timestamp,
        };

        let result: SendBundleResult = self.request("eth_sendBundle", params).await?;

        Ok(BundleSubmission {
            target_block,
            bundle_hash: result.bundle_hash,
        })
    }

    async fn await_inclusion(
        &self,
        tx_hash: B256,
        target_block: u64,
    ) -> Result<InclusionOutcome, RelayError> {
        loop {
            let latest = self
                .provider
                .get_block_number()
                .await
                .map_err(|e| RelayError::Transport(format!("{}", e)))?;

            if latest < target_block {
                tokio::time::sleep(self.block_time).await;
                continue;
            }

            let receipt = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|e| RelayError::Transport(format!("{}", e)))?;

            return Ok(match receipt {
                Some(receipt) => InclusionOutcome::Included {
                    block_number: receipt.block_number.unwrap_or_default(),
                },
                None => {
                    warn!(target_block, %tx_hash, "Target block passed without inclusion");
                    InclusionOutcome::NotIncluded
                }
            });
        }
    }
}

/// Compute the `X-Flashbots-Signature` header value for a request body.
///
/// Format is `address:signature` where the signature is a personal-message
/// signature over the 0x-hex keccak256 digest of the body.
pub fn flashbots_signature(auth: &PrivateKeySigner, body: &[u8]) -> Result<String, RelayError> {
    let digest = keccak256(body);
    let message = format!("{digest}");
    let signature = auth
        .sign_message_sync(message.as_bytes())
        .map_err(|e| RelayError::Signing(format!("{}", e)))?;

    Ok(format!(
        "{}:0x{}",
        auth.address(),
        hex::encode(signature.as_bytes())
    ))
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<T> {
    jsonrpc: &'static str,
    method: &'static str,
    params: [T; 1],
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

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CallBundleParams<'a> {
    txs: &'a [Bytes],
    block_number: String,
    state_block_number: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendBundleParams<'a> {
    txs: &'a [Bytes],
    block_number: String,
    min_timestamp: u64,
    max_timestamp: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendBundleResult {
    bundle_hash: B256,
}
