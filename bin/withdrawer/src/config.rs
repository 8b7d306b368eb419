use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level withdrawer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ethereum RPC endpoint url
    pub rpc_url: String,

    /// Chain to withdraw on (1 or 5)
    pub chain_id: u64,

    /// Reward program (Aludel) address
    pub program_address: Address,

    /// Vault (crucible) address holding the stake
    pub vault_address: Address,

    /// Address receiving the withdrawn tokens
    pub recipient_address: Address,

    /// Wallet-bridge signing endpoint; mutually exclusive with `private_key`
    pub wallet_endpoint: Option<String>,

    /// Vault owner address, required alongside `wallet_endpoint`
    pub owner_address: Option<Address>,

    /// Hex-encoded private key for local signing; mutually exclusive with
    /// `wallet_endpoint`
    pub private_key: Option<String>,

    /// Gas price estimation endpoint override
    pub gas_price_endpoint: Option<String>,

    /// Prometheus exporter port; metrics are disabled when unset
    pub metrics_port: Option<u16>,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    /// Reject configurations with no usable signing source, or an ambiguous
    /// one.
    pub fn validate(&self) -> eyre::Result<()> {
        match (&self.wallet_endpoint, &self.private_key) {
            (None, None) => {
                eyre::bail!("one of wallet_endpoint or private_key must be set")
            }
            (Some(_), Some(_)) => {
                eyre::bail!("wallet_endpoint and private_key are mutually exclusive")
            }
            (Some(_), None) if self.owner_address.is_none() => {
                eyre::bail!("owner_address is required with wallet_endpoint")
            }
            _ => Ok(()),
        }
    }
}
