//! Bundle assembly.
//!
//! A bundle is an ordered sequence of raw transactions submitted atomically.
//! Entry order is significant: the relay preserves it for execution, and the
//! same signed bundle is reused byte-for-byte across every candidate block.
//!
//! The first entry is always a placeholder: a zero-value, zero-gas-price
//! self-transfer from a freshly generated throwaway key. It carries no funds
//! and exists purely as ordering filler ahead of the real transaction.

use crate::RelayError;
use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_network::eip2718::Encodable2718;
use alloy_primitives::{Bytes, TxKind, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

/// Gas limit of the placeholder self-transfer.
const PLACEHOLDER_GAS_LIMIT: u64 = 21_000;

/// One entry of a bundle, in relay order.
#[derive(Debug, Clone)]
pub enum BundleEntry {
    /// A transaction signed at bundle-signing time by an ephemeral key.
    Unsigned {
        signer: PrivateKeySigner,
        tx: TxLegacy,
    },
    /// A pre-signed raw transaction.
    Signed(Bytes),
}

/// An ordered bundle, not yet flattened to raw bytes.
#[derive(Debug, Clone)]
pub struct Bundle {
    entries: Vec<BundleEntry>,
}

/// A bundle with every entry reduced to its raw signed encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedBundle {
    /// Raw transactions in submission order.
    pub txs: Vec<Bytes>,
}

impl Bundle {
    /// Build the two-entry withdrawal bundle: placeholder first, the real
    /// signed transaction second.
    pub fn with_placeholder(chain_id: u64, signed_tx: Bytes) -> Self {
        let throwaway = PrivateKeySigner::random();
        let placeholder = TxLegacy {
            chain_id: Some(chain_id),
            nonce: 0,
            gas_price: 0,
            gas_limit: PLACEHOLDER_GAS_LIMIT,
            to: TxKind::Call(throwaway.address()),
            value: U256::ZERO,
            input: Bytes::new(),
        };

        Self {
            entries: vec![
                BundleEntry::Unsigned {
                    signer: throwaway,
                    tx: placeholder,
                },
                BundleEntry::Signed(signed_tx),
            ],
        }
    }

    /// Entries in relay order.
    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }

    /// Sign all unsigned entries and flatten to raw transactions, preserving
    /// order.
    pub fn sign(&self) -> Result<SignedBundle, RelayError> {
        let mut txs = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            match entry {
                BundleEntry::Signed(raw) => txs.push(raw.clone()),
                BundleEntry::Unsigned { signer, tx } => {
                    let signature = signer
                        .sign_hash_sync(&tx.signature_hash())
                        .map_err(|e| RelayError::Signing(format!("{}", e)))?;
                    let envelope = TxEnvelope::Legacy(tx.clone().into_signed(signature));
                    txs.push(Bytes::from(envelope.encoded_2718()));
                }
            }
        }

        Ok(SignedBundle { txs })
    }
}
