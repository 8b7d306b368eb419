//! EIP-712 permission signing.
//!
//! Vaults accept delegate operations only with a typed-data signature from the
//! owner over `{delegate, token, amount, nonce}` under the vault's own domain.
//! The domain separation means a signature cannot be replayed against another
//! vault, another method, or another nonce.

use crate::Permission;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{eip712_domain, sol, SolStruct};
use client::{DigestSigner, SignerError};
use config::{VAULT_DOMAIN_NAME, VAULT_DOMAIN_VERSION};
use serde::{Deserialize, Serialize};
use tracing::debug;

sol! {
    /// Authorization to withdraw locked tokens
    struct Unlock {
        address delegate;
        address token;
        uint256 amount;
        uint256 nonce;
    }

    /// Authorization to lock tokens for staking
    struct Lock {
        address delegate;
        address token;
        uint256 amount;
        uint256 nonce;
    }
}

/// Which typed-data struct the owner signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionMethod {
    Unlock,
    Lock,
}

/// Compute the EIP-712 signing hash for a permission.
pub fn permission_digest(
    method: PermissionMethod,
    vault: Address,
    chain_id: u64,
    delegate: Address,
    token: Address,
    amount: U256,
    nonce: U256,
) -> B256 {
    let domain = eip712_domain! {
        name: VAULT_DOMAIN_NAME,
        version: VAULT_DOMAIN_VERSION,
        chain_id: chain_id,
        verifying_contract: vault,
    };

    match method {
        PermissionMethod::Unlock => Unlock {
            delegate,
            token,
            amount,
            nonce,
        }
        .eip712_signing_hash(&domain),
        PermissionMethod::Lock => Lock {
            delegate,
            token,
            amount,
            nonce,
        }
        .eip712_signing_hash(&domain),
    }
}

/// Sign a permission with the vault owner's signing capability.
///
/// The returned [`Permission`] is immutable and bound to `nonce`; callers
/// must read the nonce fresh for every attempt.
#[allow(clippy::too_many_arguments)]
pub async fn sign_permission<S>(
    method: PermissionMethod,
    vault: Address,
    chain_id: u64,
    signer: &S,
    delegate: Address,
    token: Address,
    amount: U256,
    nonce: U256,
) -> Result<Permission, SignerError>
where
    S: DigestSigner,
{
    let digest = permission_digest(method, vault, chain_id, delegate, token, amount, nonce);

    debug!(
        ?method,
        %vault,
        %delegate,
        %token,
        %amount,
        %nonce,
        "Requesting permission signature"
    );

    let signature = signer.sign_digest(digest).await?;

    Ok(Permission {
        method,
        owner: signer.address(),
        delegate,
        token,
        amount,
        nonce,
        signature: Bytes::from(signature.as_bytes()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use client::KeySigner;

    const VAULT: Address = address!("1111111111111111111111111111111111111111");
    const DELEGATE: Address = address!("2222222222222222222222222222222222222222");
    const TOKEN: Address = address!("3333333333333333333333333333333333333333");

    fn digest_with(method: PermissionMethod, vault: Address, chain_id: u64, nonce: u64) -> B256 {
        permission_digest(
            method,
            vault,
            chain_id,
            DELEGATE,
            TOKEN,
            U256::from(1_000),
            U256::from(nonce),
        )
    }

    #[test]
    fn test_digest_is_deterministic() {
        let a = digest_with(PermissionMethod::Unlock, VAULT, 1, 7);
        let b = digest_with(PermissionMethod::Unlock, VAULT, 1, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_is_domain_separated() {
        let base = digest_with(PermissionMethod::Unlock, VAULT, 1, 7);

        // Different method, vault, chain and nonce each produce a different hash.
        assert_ne!(base, digest_with(PermissionMethod::Lock, VAULT, 1, 7));
        assert_ne!(
            base,
            digest_with(
                PermissionMethod::Unlock,
                address!("4444444444444444444444444444444444444444"),
                1,
                7
            )
        );
        assert_ne!(base, digest_with(PermissionMethod::Unlock, VAULT, 5, 7));
        assert_ne!(base, digest_with(PermissionMethod::Unlock, VAULT, 1, 8));
    }

    #[tokio::test]
    async fn test_sign_permission_recovers_owner() {
        let signer = KeySigner::random();
        let amount = U256::from(42);
        let nonce = U256::from(3);

        let permission = sign_permission(
            PermissionMethod::Unlock,
            VAULT,
            1,
            &signer,
            DELEGATE,
            TOKEN,
            amount,
            nonce,
        )
        .await
        .expect("should sign");

        assert_eq!(permission.owner, signer.address());
        assert_eq!(permission.signature.len(), 65);

        let digest = permission_digest(
            PermissionMethod::Unlock,
            VAULT,
            1,
            DELEGATE,
            TOKEN,
            amount,
            nonce,
        );
        let signature = alloy_primitives::Signature::from_raw(&permission.signature)
            .expect("valid signature bytes");
        let recovered = signature
            .recover_address_from_prehash(&digest)
            .expect("should recover");
        assert_eq!(recovered, signer.address());
    }
}
