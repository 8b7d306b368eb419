use crate::VaultReader;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use binding::{aludel::IAludel, crucible::ICrucible, token::IERC20};
use eyre::Result;
use tracing::debug;

// Vault reader implementation backed by an RPC provider.
pub struct OnchainVault<P> {
    provider: P,
}

impl<P> OnchainVault<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> VaultReader for OnchainVault<P>
where
    P: Provider + Clone,
{
    async fn nonce(&self, vault: Address) -> Result<U256> {
        debug!("Querying vault nonce: vault={}", vault);

        let contract = ICrucible::new(vault, &self.provider);
        let nonce = contract.getNonce().call().await?;

        Ok(nonce)
    }

    async fn staking_token(&self, program: Address) -> Result<Address> {
        debug!("Querying staking token: program={}", program);

        let contract = IAludel::new(program, &self.provider);
        let data = contract.getAludelData().call().await?;

        Ok(data.stakingToken)
    }

    async fn held_balance(&self, token: Address, vault: Address) -> Result<U256> {
        debug!("Querying erc20 {} balance: vault={}", token, vault);

        let contract = IERC20::new(token, &self.provider);
        let amount = contract.balanceOf(vault).call().await?;

        Ok(amount)
    }
}
