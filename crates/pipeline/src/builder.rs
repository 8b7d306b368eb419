//! Out-of-band transaction assembly.
//!
//! The wallet's standard transaction-signing flow cannot be composed into a
//! relay bundle, so the pipeline builds the withdrawal call itself: a legacy
//! gas-priced transaction with explicit nonce/gas fields and no sender
//! binding, signed over its signature hash through the raw digest capability
//! and serialized to the raw encoding the relay expects.

use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_network::eip2718::Encodable2718;
use alloy_primitives::{Address, Bytes, TxKind, B256, U256};
use alloy_sol_types::SolCall;
use binding::aludel::IAludel;
use client::{DigestSigner, SignerError};
use tracing::debug;
use vault::Permission;

/// A raw signed transaction and its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// RLP encoding, ready for bundle inclusion
    pub raw: Bytes,
    /// Transaction hash
    pub hash: B256,
}

/// ABI-encode the `unstakeAndClaim` call for a signed permission.
pub fn withdrawal_calldata(
    vault: Address,
    recipient: Address,
    amount: U256,
    permission: &Permission,
) -> Bytes {
    IAludel::unstakeAndClaimCall {
        vault,
        recipient,
        amount,
        permission: permission.signature.clone(),
    }
    .abi_encode()
    .into()
}

/// Populate the unsigned withdrawal transaction.
///
/// Legacy (gas-priced) shape, chain id attached for EIP-155 replay
/// protection. There is no sender field: the sender is bound only by the
/// signature added later, which keeps the transaction signable independent of
/// any wallet-managed account state.
pub const fn build_unsigned(
    program: Address,
    calldata: Bytes,
    nonce: u64,
    gas_limit: u64,
    gas_price: u128,
    chain_id: u64,
) -> TxLegacy {
    TxLegacy {
        chain_id: Some(chain_id),
        nonce,
        gas_price,
        gas_limit,
        to: TxKind::Call(program),
        value: U256::ZERO,
        input: calldata,
    }
}

/// Sign the transaction's canonical digest and produce the raw encoding.
pub async fn sign_transaction<S>(
    tx: TxLegacy,
    signer: &S,
) -> Result<SignedTransaction, SignerError>
where
    S: DigestSigner,
{
    let digest = tx.signature_hash();
    let signature = signer.sign_digest(digest).await?;

    let envelope = TxEnvelope::Legacy(tx.into_signed(signature));
    let raw = Bytes::from(envelope.encoded_2718());
    let hash = *envelope.tx_hash();

    debug!(%hash, bytes = raw.len(), "Assembled raw withdrawal transaction");

    Ok(SignedTransaction { raw, hash })
}
