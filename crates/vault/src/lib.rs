//! Vault state reads and signed withdrawal permissions.
//!
//! This crate provides high-level interfaces for reading the on-chain state a
//! withdrawal depends on (vault nonce, staking token, held balance) and for
//! producing the EIP-712 permission the vault requires before a delegate may
//! unlock funds.

pub mod permission;
pub mod reader;

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::future::Future;

pub use permission::{permission_digest, sign_permission, PermissionMethod};

/// A signed, single-use authorization allowing a delegate to move a specific
/// amount out of a vault.
///
/// Tied to the vault nonce it was signed over; once the vault consumes the
/// nonce the permission is spent and a fresh one must be signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Typed-data method the owner authorized
    pub method: PermissionMethod,
    /// Vault owner that signed
    pub owner: Address,
    /// Delegate allowed to act (the reward program)
    pub delegate: Address,
    /// Token the permission covers
    pub token: Address,
    /// Amount the delegate may move
    pub amount: U256,
    /// Vault nonce the signature is bound to
    pub nonce: U256,
    /// 65-byte ECDSA signature, as passed to the contract
    pub signature: Bytes,
}

/// Trait for reading the vault-side state of a withdrawal.
pub trait VaultReader: Send + Sync {
    /// Current permission nonce of the vault.
    fn nonce(&self, vault: Address) -> impl Future<Output = eyre::Result<U256>> + Send;

    /// Staking token of a reward program.
    fn staking_token(&self, program: Address) -> impl Future<Output = eyre::Result<Address>> + Send;

    /// Balance of `token` held by the vault contract.
    fn held_balance(
        &self,
        token: Address,
        vault: Address,
    ) -> impl Future<Output = eyre::Result<U256>> + Send;
}
