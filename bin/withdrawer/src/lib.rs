pub mod config;
pub mod metrics;

use pipeline::{translate, ProgressEvent};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info};

/// Consume pipeline progress until the terminal event, logging each step.
///
/// Returns the terminal event, or `None` when the channel closes without one
/// (the suppressed internal RPC case).
pub async fn report_progress(
    mut events: UnboundedReceiver<ProgressEvent>,
    metrics: metrics::Metrics,
) -> Option<ProgressEvent> {
    while let Some(event) = events.recv().await {
        match &event {
            ProgressEvent::PendingSignature { step, total_steps } => {
                info!("Waiting for signature ({step}/{total_steps})");
            }
            ProgressEvent::BundlePending => {
                info!("Bundle handed to relay, awaiting inclusion");
            }
            ProgressEvent::BundleConfirmed { message } => {
                metrics.record_confirmed();
                info!("{message}");
                return Some(event);
            }
            ProgressEvent::Error { message, code } => {
                metrics.record_failed(*code);
                error!(code, "{}", translate(message));
                return Some(event);
            }
        }
    }

    None
}
