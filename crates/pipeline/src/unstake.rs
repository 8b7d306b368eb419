//! The `unstakeAndClaim` withdrawal flow, end to end.
//!
//! Each invocation is self-contained: vault nonce, gas price and account
//! nonce are read fresh, the permission and transaction are signed against
//! those reads, and the bundle is submitted once across the candidate
//! window. On failure the caller re-invokes; nothing here retries.

use crate::{
    builder::{build_unsigned, sign_transaction, withdrawal_calldata},
    error::PipelineError,
    submit::submit_window,
    ChainReader, ProgressEvent, ProgressSink,
};
use alloy_primitives::{Address, U256};
use client::DigestSigner;
use config::RelayNetwork;
use oracle::GasPriceOracle;
use relay::Relay;
use std::sync::Arc;
use tracing::{info, instrument};
use vault::{sign_permission, PermissionMethod, VaultReader};

/// Parameters of one withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalRequest {
    /// Reward program contract holding the stake
    pub program: Address,
    /// Vault the stake is locked in
    pub vault: Address,
    /// Address receiving the withdrawn tokens
    pub recipient: Address,
    /// Amount of staking tokens to withdraw
    pub amount: U256,
    /// Chain to withdraw on
    pub chain_id: u64,
}

/// Run the withdrawal pipeline, reporting progress on `sink`.
///
/// Emits exactly one terminal event per invocation: `BundleConfirmed` on
/// inclusion, or `Error` on failure, with the single exception of the
/// suppressed internal RPC artifact (see
/// [`INTERNAL_RPC_ERROR_CODE`](crate::error::INTERNAL_RPC_ERROR_CODE)),
/// which returns `Err` without a terminal event. Returns the block number
/// the bundle landed in.
pub async fn unstake_and_claim<S, V, C, R>(
    request: WithdrawalRequest,
    signer: &S,
    vault_reader: &V,
    chain: &C,
    oracle: &GasPriceOracle,
    relay: Arc<R>,
    sink: &ProgressSink,
) -> Result<u64, PipelineError>
where
    S: DigestSigner,
    V: VaultReader,
    C: ChainReader,
    R: Relay + Send + Sync + 'static,
{
    match run(request, signer, vault_reader, chain, oracle, relay, sink).await {
        Ok(block_number) => Ok(block_number),
        Err(e) => {
            if let Some(event) = e.to_event() {
                let _ = sink.send(event);
            }
            Err(e)
        }
    }
}

#[instrument(skip_all, fields(vault = %request.vault, amount = %request.amount))]
async fn run<S, V, C, R>(
    request: WithdrawalRequest,
    signer: &S,
    vault_reader: &V,
    chain: &C,
    oracle: &GasPriceOracle,
    relay: Arc<R>,
    sink: &ProgressSink,
) -> Result<u64, PipelineError>
where
    S: DigestSigner,
    V: VaultReader,
    C: ChainReader,
    R: Relay + Send + Sync + 'static,
{
    // Everything downstream assumes a relay endpoint exists for this chain.
    RelayNetwork::from_chain_id(request.chain_id)?;

    let token = vault_reader.staking_token(request.program).await?;
    let held = vault_reader.held_balance(token, request.vault).await?;
    if held < request.amount {
        return Err(PipelineError::InsufficientBalance {
            requested: request.amount,
            held,
        });
    }

    // The permission is bound to the nonce read here; a stale read would
    // produce a signature the vault rejects.
    let permission_nonce = vault_reader.nonce(request.vault).await?;

    let _ = sink.send(ProgressEvent::PendingSignature {
        step: 1,
        total_steps: 2,
    });

    let permission = sign_permission(
        PermissionMethod::Unlock,
        request.vault,
        request.chain_id,
        signer,
        request.program,
        token,
        request.amount,
        permission_nonce,
    )
    .await?;

    let calldata = withdrawal_calldata(request.vault, request.recipient, request.amount, &permission);

    let gas_limit = chain
        .estimate_gas(signer.address(), request.program, calldata.clone())
        .await?;
    let gas_price = oracle.gas_price().await?;
    let account_nonce = chain.account_nonce(signer.address()).await?;

    let _ = sink.send(ProgressEvent::PendingSignature {
        step: 2,
        total_steps: 2,
    });

    let unsigned = build_unsigned(
        request.program,
        calldata,
        account_nonce,
        gas_limit,
        gas_price,
        request.chain_id,
    );
    let signed = sign_transaction(unsigned, signer).await?;

    info!(hash = %signed.hash, gas_limit, gas_price, "Withdrawal transaction signed");

    let _ = sink.send(ProgressEvent::BundlePending);

    let best = chain.best_block().await?;
    submit_window(relay, request.chain_id, &signed, best.number, best.timestamp, sink).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        drain_events, MockChain, MockRelay, MockSigner, MockVault, SignBehavior,
    };
    use crate::INTERNAL_RPC_ERROR_CODE;
    use alloy_primitives::address;
    use config::TARGET_BLOCK_COUNT;
    use tokio::sync::mpsc;

    const PROGRAM: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    const VAULT: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
    const RECIPIENT: Address = address!("cccccccccccccccccccccccccccccccccccccccc");

    fn request() -> WithdrawalRequest {
        WithdrawalRequest {
            program: PROGRAM,
            vault: VAULT,
            recipient: RECIPIENT,
            amount: U256::from(1_000),
            chain_id: 1,
        }
    }

    /// Oracle pointed at a closed port; tests that must fail earlier never
    /// reach it.
    fn unreachable_oracle() -> GasPriceOracle {
        GasPriceOracle::new("http://127.0.0.1:1/gas")
    }

    async fn quoting_oracle(server: &mut mockito::Server) -> GasPriceOracle {
        server
            .mock("GET", "/gas")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":200,"data":{"fast":10,"rapid":20}}"#)
            .create_async()
            .await;
        GasPriceOracle::new(format!("{}/gas", server.url()))
    }

    #[tokio::test]
    async fn test_happy_path_event_sequence() {
        let mut server = mockito::Server::new_async().await;
        let oracle = quoting_oracle(&mut server).await;

        let signer = MockSigner::new(vec![SignBehavior::Sign, SignBehavior::Sign]);
        let vault_reader = MockVault::holding(10_000);
        let chain = MockChain::default();
        let relay = Arc::new(MockRelay::confirming(101, vec![2]));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let block = unstake_and_claim(
            request(),
            &signer,
            &vault_reader,
            &chain,
            &oracle,
            Arc::clone(&relay),
            &tx,
        )
        .await
        .expect("should confirm");

        assert_eq!(block, 103);
        assert_eq!(signer.calls(), 2);
        assert_eq!(relay.submission_count(), TARGET_BLOCK_COUNT as usize);

        let events = drain_events(&mut rx);
        assert_eq!(
            events,
            vec![
                ProgressEvent::PendingSignature {
                    step: 1,
                    total_steps: 2
                },
                ProgressEvent::PendingSignature {
                    step: 2,
                    total_steps: 2
                },
                ProgressEvent::BundlePending,
                ProgressEvent::BundleConfirmed {
                    message: "Your transaction was successfully completed via Flashbots!"
                        .to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_insufficient_balance_fails_before_any_signature() {
        let signer = MockSigner::panicking();
        let vault_reader = MockVault::holding(10);
        let chain = MockChain::default();
        let relay = Arc::new(MockRelay::confirming(101, vec![]));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = unstake_and_claim(
            request(),
            &signer,
            &vault_reader,
            &chain,
            &unreachable_oracle(),
            Arc::clone(&relay),
            &tx,
        )
        .await;

        assert!(matches!(
            result,
            Err(PipelineError::InsufficientBalance { .. })
        ));
        assert_eq!(relay.submission_count(), 0);

        let events = drain_events(&mut rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            ProgressEvent::Error { message, .. } => {
                assert!(message.contains("insufficient balance"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unsupported_chain_rejected_up_front() {
        let signer = MockSigner::panicking();
        let vault_reader = MockVault::holding(10_000);
        let chain = MockChain::default();
        let relay = Arc::new(MockRelay::confirming(101, vec![]));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = unstake_and_claim(
            WithdrawalRequest {
                chain_id: 137,
                ..request()
            },
            &signer,
            &vault_reader,
            &chain,
            &unreachable_oracle(),
            Arc::clone(&relay),
            &tx,
        )
        .await;

        assert!(matches!(result, Err(PipelineError::UnsupportedChain(_))));
        assert_eq!(relay.submission_count(), 0);
        assert_eq!(drain_events(&mut rx).len(), 1);
    }

    #[tokio::test]
    async fn test_declined_permission_is_terminal() {
        let signer = MockSigner::new(vec![SignBehavior::Decline]);
        let vault_reader = MockVault::holding(10_000);
        let chain = MockChain::default();
        let relay = Arc::new(MockRelay::confirming(101, vec![]));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = unstake_and_claim(
            request(),
            &signer,
            &vault_reader,
            &chain,
            &unreachable_oracle(),
            Arc::clone(&relay),
            &tx,
        )
        .await;

        assert!(matches!(result, Err(PipelineError::SignatureDeclined)));
        assert_eq!(signer.calls(), 1);
        assert_eq!(relay.submission_count(), 0);

        let events = drain_events(&mut rx);
        // One pending-signature event, then the terminal error.
        assert_eq!(events.len(), 2);
        match &events[1] {
            ProgressEvent::Error { message, .. } => {
                assert_eq!(message, "User denied transaction signature");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_oracle_failure_aborts_before_second_signature() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gas")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":500,"data":{"fast":0,"rapid":0}}"#)
            .create_async()
            .await;
        let oracle = GasPriceOracle::new(format!("{}/gas", server.url()));

        let signer = MockSigner::new(vec![SignBehavior::Sign]);
        let vault_reader = MockVault::holding(10_000);
        let chain = MockChain::default();
        let relay = Arc::new(MockRelay::confirming(101, vec![]));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = unstake_and_claim(
            request(),
            &signer,
            &vault_reader,
            &chain,
            &oracle,
            Arc::clone(&relay),
            &tx,
        )
        .await;

        assert!(matches!(result, Err(PipelineError::Oracle(_))));
        assert_eq!(signer.calls(), 1);
        assert_eq!(relay.submission_count(), 0);

        let events = drain_events(&mut rx);
        assert_eq!(events.len(), 2);
        match &events[1] {
            ProgressEvent::Error { message, .. } => {
                assert_eq!(
                    message,
                    "Unable to retrieve Gas price from API, please try again."
                );
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_internal_rpc_error_returns_without_terminal_event() {
        let mut server = mockito::Server::new_async().await;
        let oracle = quoting_oracle(&mut server).await;

        let signer = MockSigner::new(vec![
            SignBehavior::Sign,
            SignBehavior::RpcError(INTERNAL_RPC_ERROR_CODE),
        ]);
        let vault_reader = MockVault::holding(10_000);
        let chain = MockChain::default();
        let relay = Arc::new(MockRelay::confirming(101, vec![]));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = unstake_and_claim(
            request(),
            &signer,
            &vault_reader,
            &chain,
            &oracle,
            Arc::clone(&relay),
            &tx,
        )
        .await;

        assert!(matches!(
            result,
            Err(PipelineError::Rpc {
                code: INTERNAL_RPC_ERROR_CODE,
                ..
            })
        ));
        assert_eq!(relay.submission_count(), 0);

        // Both pending-signature events but no terminal event of either kind.
        let events = drain_events(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| !e.is_terminal()));
    }

    #[tokio::test]
    async fn test_window_exhaustion_surfaces_retry_message() {
        let mut server = mockito::Server::new_async().await;
        let oracle = quoting_oracle(&mut server).await;

        let signer = MockSigner::new(vec![SignBehavior::Sign, SignBehavior::Sign]);
        let vault_reader = MockVault::holding(10_000);
        let chain = MockChain::default();
        let relay = Arc::new(MockRelay::confirming(101, vec![]));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = unstake_and_claim(
            request(),
            &signer,
            &vault_reader,
            &chain,
            &oracle,
            Arc::clone(&relay),
            &tx,
        )
        .await;

        assert!(matches!(result, Err(PipelineError::NotIncluded)));
        assert_eq!(relay.submission_count(), TARGET_BLOCK_COUNT as usize);

        let events = drain_events(&mut rx);
        match events.last() {
            Some(ProgressEvent::Error { message, .. }) => {
                assert_eq!(
                    message,
                    "Failed to get Bundle included via Flashbots, please try again."
                );
            }
            other => panic!("unexpected final event: {other:?}"),
        }
    }
}
