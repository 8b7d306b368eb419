//! Bundle submission across the candidate-block window.
//!
//! One submission attempt fans out twice: the signed bundle is sent to the
//! relay for each of the 15 consecutive candidate blocks in parallel, and
//! each submission's inclusion is awaited in parallel. Nothing is cancelled
//! once dispatched; losing branches run to completion and their outcomes are
//! observed but discarded.

use crate::{builder::SignedTransaction, error::PipelineError, ProgressEvent, ProgressSink};
use config::TARGET_BLOCK_COUNT;
use relay::{Bundle, InclusionOutcome, Relay, RelayError, ValidityWindow};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Message attached to the terminal confirmation event.
const CONFIRMED_MESSAGE: &str = "Your transaction was successfully completed via Flashbots!";

/// Simulate and submit the withdrawal bundle, awaiting inclusion.
///
/// Success means at least one candidate block included the bundle; the block
/// number of the first observed confirmation is returned and a single
/// [`ProgressEvent::BundleConfirmed`] is emitted, regardless of how many
/// branches confirm. Exhausting the window without inclusion is terminal:
/// the caller must re-invoke the whole pipeline for fresh nonce and price.
pub async fn submit_window<R>(
    relay: Arc<R>,
    chain_id: u64,
    signed_tx: &SignedTransaction,
    best_block: u64,
    best_timestamp: u64,
    sink: &ProgressSink,
) -> Result<u64, PipelineError>
where
    R: Relay + Send + Sync + 'static,
{
    let bundle = Bundle::with_placeholder(chain_id, signed_tx.raw.clone());
    let signed_bundle = Arc::new(bundle.sign()?);

    let first_target = best_block + 1;

    // Dry-run before anything reaches the relay queue; a simulation error
    // aborts with the relay's diagnostic and no submission is made.
    relay.simulate(&signed_bundle, first_target).await?;

    let window = ValidityWindow::starting_at(best_timestamp);
    let tx_hash = signed_tx.hash;

    info!(
        first_target,
        count = TARGET_BLOCK_COUNT,
        min_timestamp = window.min_timestamp,
        max_timestamp = window.max_timestamp,
        "Submitting bundle across candidate blocks"
    );

    let mut tasks: JoinSet<Result<InclusionOutcome, RelayError>> = JoinSet::new();

    for offset in 0..TARGET_BLOCK_COUNT {
        let relay = Arc::clone(&relay);
        let signed_bundle = Arc::clone(&signed_bundle);
        let target_block = first_target + offset;

        tasks.spawn(async move {
            let submission = relay.send_bundle(&signed_bundle, target_block, window).await?;
            debug!(
                target_block,
                bundle_hash = %submission.bundle_hash,
                "Bundle submitted for inclusion attempt"
            );
            relay.await_inclusion(tx_hash, target_block).await
        });
    }

    // First confirmation wins; later ones are observed but must not produce
    // a second terminal event.
    let mut included_block = None;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(InclusionOutcome::Included { block_number })) => {
                if included_block.is_none() {
                    included_block = Some(block_number);
                    info!(block_number, "Bundle included");
                    let _ = sink.send(ProgressEvent::BundleConfirmed {
                        message: CONFIRMED_MESSAGE.to_string(),
                    });
                } else {
                    debug!(block_number, "Late inclusion confirmation observed");
                }
            }
            Ok(Ok(InclusionOutcome::NotIncluded)) => {}
            Ok(Err(e)) => warn!(error = %e, "Bundle submission branch failed"),
            Err(e) => warn!(error = %e, "Submission task aborted"),
        }
    }

    included_block.ok_or(PipelineError::NotIncluded)
}
