//! Network configuration for private bundle submission.
//!
//! Provides chain-specific relay endpoints and parameters for the networks
//! the relay supports (mainnet, Görli testnet).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of consecutive blocks a bundle is submitted against.
pub const TARGET_BLOCK_COUNT: u64 = 15;

/// How long a submitted bundle stays valid, in seconds.
///
/// The relay rejects bundles outside `[min_timestamp, min_timestamp + window]`,
/// bounding how long a stale submission can land.
pub const BUNDLE_VALIDITY_SECS: u64 = 240;

/// Gas price estimation endpoint (fast/rapid tiers).
pub const GAS_PRICE_ENDPOINT: &str = "https://www.gasnow.org/api/v3/gas/price";

/// EIP-712 domain name shared by all universal vaults.
pub const VAULT_DOMAIN_NAME: &str = "UniversalVault";

/// EIP-712 domain version shared by all universal vaults.
pub const VAULT_DOMAIN_VERSION: &str = "1.0.0";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The relay has no endpoint for this chain.
    #[error("unsupported chain id for private relay: {0}")]
    UnsupportedChain(u64),
}

/// Relay network variant, keyed by chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayNetwork {
    Mainnet,
    Goerli,
}

impl RelayNetwork {
    /// Resolve the relay variant for a chain id.
    ///
    /// Only mainnet (1) and Görli (5) are served by the relay; everything else
    /// is rejected before any signature is requested.
    pub const fn from_chain_id(chain_id: u64) -> Result<Self, NetworkError> {
        match chain_id {
            1 => Ok(Self::Mainnet),
            5 => Ok(Self::Goerli),
            other => Err(NetworkError::UnsupportedChain(other)),
        }
    }

    /// The relay JSON-RPC endpoint for this network.
    pub const fn relay_endpoint(self) -> &'static str {
        match self {
            Self::Mainnet => "https://relay.flashbots.net",
            Self::Goerli => "https://relay-goerli.flashbots.net",
        }
    }

    /// Chain id of this network.
    pub const fn chain_id(self) -> u64 {
        match self {
            Self::Mainnet => 1,
            Self::Goerli => 5,
        }
    }

    /// Block time in seconds, used to pace inclusion polling.
    pub const fn block_time_secs(self) -> u64 {
        match self {
            Self::Mainnet => 12,
            Self::Goerli => 15,
        }
    }
}

/// Complete network configuration for a withdrawal pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Relay network variant
    pub relay: RelayNetwork,
    /// Gas price estimation endpoint
    pub gas_price_endpoint: String,
}

impl NetworkConfig {
    /// Resolve configuration from a chain id.
    pub fn from_chain_id(chain_id: u64) -> Result<Self, NetworkError> {
        let relay = RelayNetwork::from_chain_id(chain_id)?;
        Ok(Self {
            relay,
            gas_price_endpoint: GAS_PRICE_ENDPOINT.to_string(),
        })
    }

    /// Override the gas price endpoint (used by tests to point at a local server).
    pub fn with_gas_price_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.gas_price_endpoint = endpoint.into();
        self
    }
}
