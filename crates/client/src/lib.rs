mod wallet_signer;

use alloy_primitives::{Address, Signature, B256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use std::future::Future;
use thiserror::Error;
pub use wallet_signer::{RawSigningScope, WalletSigner};

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error connecting to the RPC endpoint
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// General error with context
    #[error("Client error: {0}")]
    Other(String),
}

/// Errors surfaced by a signing capability.
#[derive(Error, Debug)]
pub enum SignerError {
    /// The user (or upstream wallet) refused to sign.
    #[error("signature request declined")]
    Declined,

    /// Transport-level failure talking to the signing endpoint.
    #[error("signer transport error: {0}")]
    Transport(String),

    /// JSON-RPC level error returned by the signing endpoint.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The endpoint returned something that is not a 65-byte signature.
    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),
}

/// EIP-1193 error code for a user-rejected request.
pub const USER_REJECTED_CODE: i64 = 4001;

/// A capability that signs raw 32-byte digests for a fixed account.
///
/// This is deliberately lower-level than transaction signing: the pipeline
/// computes transaction and typed-data digests itself and only needs a
/// signature over the hash, so the same capability serves both the permission
/// signature and the out-of-band transaction signature.
pub trait DigestSigner: Send + Sync {
    /// Address of the signing account.
    fn address(&self) -> Address;

    /// Sign a 32-byte digest, returning the 65-byte ECDSA signature.
    fn sign_digest(
        &self,
        digest: B256,
    ) -> impl Future<Output = Result<Signature, SignerError>> + Send;
}

/// Convenience function to create an ethereum rpc provider from url.
pub async fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}

/// A local in-process signing capability backed by a private key.
///
/// Used by the CLI runner and by tests; production deployments sign through
/// a [`WalletSigner`] so keys never live in this process.
#[derive(Debug, Clone)]
pub struct KeySigner {
    inner: PrivateKeySigner,
}

impl KeySigner {
    pub fn new(private_key: &str) -> Result<Self, ClientError> {
        let inner: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| ClientError::InvalidPrivateKey(format!("{}", e)))?;
        Ok(Self { inner })
    }

    /// A throwaway signer over a freshly generated key.
    pub fn random() -> Self {
        Self {
            inner: PrivateKeySigner::random(),
        }
    }
}

impl DigestSigner for KeySigner {
    fn address(&self) -> Address {
        self.inner.address()
    }

    async fn sign_digest(&self, digest: B256) -> Result<Signature, SignerError> {
        self.inner
            .sign_hash_sync(&digest)
            .map_err(|e| SignerError::InvalidSignature(format!("{}", e)))
    }
}
