//! Configuration types for the private withdrawal pipeline.
//!
//! This crate provides:
//! - Relay network selection keyed by chain id (mainnet, Görli)
//! - Gas oracle endpoint and bundle submission parameters
//! - Vault EIP-712 domain constants

pub mod network;

pub use network::{
    NetworkConfig, NetworkError, RelayNetwork, BUNDLE_VALIDITY_SECS, GAS_PRICE_ENDPOINT,
    TARGET_BLOCK_COUNT, VAULT_DOMAIN_NAME, VAULT_DOMAIN_VERSION,
};
