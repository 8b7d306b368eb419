//! Private relay client for MEV-protected bundle submission.
//!
//! This crate provides:
//! - [`Bundle`] construction with a placeholder entry guarding ordering
//! - The [`Relay`] trait: simulate, submit, and await inclusion of a bundle
//! - [`FlashbotsClient`], the HTTP implementation authenticated with an
//!   ephemeral request-signing identity

pub mod bundle;
pub mod client;

pub use bundle::{Bundle, BundleEntry, SignedBundle};
pub use client::FlashbotsClient;

use alloy_primitives::B256;
use config::BUNDLE_VALIDITY_SECS;
use std::future::Future;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RelayError {
    /// The relay's dry-run of the bundle reported an error; carries the
    /// simulator's diagnostic verbatim.
    #[error("bundle simulation failed ({code}): {message}")]
    Simulation { code: i64, message: String },

    /// JSON-RPC level error from the relay.
    #[error("relay error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Network-level failure reaching the relay.
    #[error("relay transport error: {0}")]
    Transport(String),

    /// Failed to sign an entry or the request payload.
    #[error("bundle signing failed: {0}")]
    Signing(String),
}

/// Timestamp range a submitted bundle is valid within.
///
/// The relay enforces the window; the client never cancels on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    pub min_timestamp: u64,
    pub max_timestamp: u64,
}

impl ValidityWindow {
    /// Window opening at `timestamp` (the current best block's timestamp) and
    /// closing [`BUNDLE_VALIDITY_SECS`] later.
    pub const fn starting_at(timestamp: u64) -> Self {
        Self {
            min_timestamp: timestamp,
            max_timestamp: timestamp + BUNDLE_VALIDITY_SECS,
        }
    }
}

/// Receipt of one bundle submission against one target block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSubmission {
    /// Block the bundle was targeted at
    pub target_block: u64,
    /// Relay-assigned bundle hash
    pub bundle_hash: B256,
}

/// Outcome of awaiting a submission's target block.
///
/// Explicit tags instead of the relay libraries' numeric resolution sentinel:
/// the pipeline's success test does not depend on a borrowed convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InclusionOutcome {
    /// The bundle's transaction landed on chain.
    Included { block_number: u64 },
    /// The target block passed without the bundle.
    NotIncluded,
}

/// Trait for submitting bundles to a block-producer relay.
pub trait Relay: Send + Sync {
    /// Dry-run the bundle against `target_block` state. `Ok(())` means the
    /// relay found no error.
    fn simulate(
        &self,
        bundle: &SignedBundle,
        target_block: u64,
    ) -> impl Future<Output = Result<(), RelayError>> + Send;

    /// Submit the bundle for inclusion in `target_block`.
    fn send_bundle(
        &self,
        bundle: &SignedBundle,
        target_block: u64,
        window: ValidityWindow,
    ) -> impl Future<Output = Result<BundleSubmission, RelayError>> + Send;

    /// Wait until `target_block` has been mined and report whether the
    /// transaction identified by `tx_hash` made it in.
    fn await_inclusion(
        &self,
        tx_hash: B256,
        target_block: u64,
    ) -> impl Future<Output = Result<InclusionOutcome, RelayError>> + Send;
}
