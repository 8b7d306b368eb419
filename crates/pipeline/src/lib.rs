//! The MEV-protected withdrawal pipeline.
//!
//! Turns "withdraw X from this vault" into a confirmed (or failed) private
//! bundle: signs the vault permission, builds and raw-signs the withdrawal
//! transaction out-of-band from the wallet's broadcast path, and submits it
//! through a block-producer relay across a window of candidate blocks.
//!
//! The caller supplies the initiating parameters and a [`ProgressSink`]; the
//! pipeline reports progress on the sink and emits exactly one terminal event
//! per invocation.

pub mod builder;
pub mod error;
pub mod submit;
pub mod translate;
pub mod unstake;

use alloy_primitives::{Address, Bytes, TxKind, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::{BlockNumberOrTag, TransactionInput, TransactionRequest};
use std::future::Future;

pub use builder::{sign_transaction, withdrawal_calldata, SignedTransaction};
pub use error::{PipelineError, INTERNAL_RPC_ERROR_CODE};
pub use translate::translate;
pub use unstake::{unstake_and_claim, WithdrawalRequest};

/// Progress of one pipeline invocation, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The pipeline is waiting on the user's signature (`step` of `total_steps`).
    PendingSignature { step: u8, total_steps: u8 },
    /// The bundle has been handed to the relay.
    BundlePending,
    /// Terminal: the bundle landed on chain.
    BundleConfirmed { message: String },
    /// Terminal: the pipeline failed.
    Error { message: String, code: i64 },
}

impl ProgressEvent {
    /// Whether this event terminates the stream.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::BundleConfirmed { .. } | Self::Error { .. })
    }
}

/// One-way event channel owned by the caller.
pub type ProgressSink = tokio::sync::mpsc::UnboundedSender<ProgressEvent>;

/// Latest block reference used to anchor the submission window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestBlock {
    pub number: u64,
    pub timestamp: u64,
}

/// The node reads the pipeline performs outside of contract calls.
pub trait ChainReader: Send + Sync {
    /// Transaction count of an account (the user's next nonce).
    fn account_nonce(&self, address: Address) -> impl Future<Output = eyre::Result<u64>> + Send;

    /// Gas estimation for a contract call.
    fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> impl Future<Output = eyre::Result<u64>> + Send;

    /// Number and timestamp of the latest block.
    fn best_block(&self) -> impl Future<Output = eyre::Result<BestBlock>> + Send;
}

/// [`ChainReader`] backed by an RPC provider.
#[derive(Debug, Clone)]
pub struct NodeReader<P> {
    provider: P,
}

impl<P> NodeReader<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> ChainReader for NodeReader<P>
where
    P: Provider + Clone,
{
    async fn account_nonce(&self, address: Address) -> eyre::Result<u64> {
        let nonce = self.provider.get_transaction_count(address).await?;
        Ok(nonce)
    }

    async fn estimate_gas(&self, from: Address, to: Address, input: Bytes) -> eyre::Result<u64> {
        let tx = TransactionRequest {
            from: Some(from),
            to: Some(TxKind::Call(to)),
            input: TransactionInput::new(input),
            ..Default::default()
        };

        let gas = self.provider.estimate_gas(tx).await?;
        Ok(gas)
    }

    async fn best_block(&self) -> eyre::Result<BestBlock> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await?
            .ok_or_else(|| eyre::eyre!("latest block unavailable"))?;

        Ok(BestBlock {
            number: block.header.number,
            timestamp: block.header.timestamp,
        })
    }
}
