//! Pipeline failure taxonomy.
//!
//! Every failure surfaces through the same terminal [`ProgressEvent::Error`]
//! shape, and none are retried internally: nonce and gas price are only valid
//! at read time, so retry is a caller-level re-invocation of the whole
//! pipeline.

use crate::ProgressEvent;
use alloy_primitives::U256;
use client::SignerError;
use config::NetworkError;
use oracle::OracleError;
use relay::RelayError;
use thiserror::Error;

/// Node-side error code for a duplicate/stale submission artifact.
///
/// Errors carrying this code are suppressed rather than surfaced: they do not
/// represent a user-facing failure. Kept as an explicit classified case so the
/// behavior is visible and testable.
pub const INTERNAL_RPC_ERROR_CODE: i64 = -32603;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The vault holds less than the requested amount. Checked before any
    /// signature is requested.
    #[error("insufficient balance: requested {requested}, vault holds {held}")]
    InsufficientBalance { requested: U256, held: U256 },

    /// The user declined a signature request.
    #[error("User denied transaction signature")]
    SignatureDeclined,

    /// Gas price estimation failed; the pipeline aborts rather than submit
    /// with an undefined price.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// The relay has no endpoint for the requested chain.
    #[error(transparent)]
    UnsupportedChain(#[from] NetworkError),

    /// Bundle simulation reported an error; diagnostic carried verbatim.
    #[error("{message}")]
    Simulation { code: i64, message: String },

    /// No candidate block included the bundle.
    #[error("Failed to get Bundle included via Flashbots, please try again.")]
    NotIncluded,

    /// JSON-RPC error passed through from a node or wallet endpoint.
    #[error("{message}")]
    Rpc { code: i64, message: String },

    /// Anything else, message passed through verbatim.
    #[error("{0}")]
    Other(String),
}

impl PipelineError {
    /// Error code reported alongside the message.
    pub const fn code(&self) -> i64 {
        match self {
            Self::Simulation { code, .. } | Self::Rpc { code, .. } => *code,
            _ => 0,
        }
    }

    /// Classify into a terminal event, or `None` when the error is the
    /// suppressed duplicate-submission artifact.
    pub fn to_event(&self) -> Option<ProgressEvent> {
        if let Self::Rpc {
            code: INTERNAL_RPC_ERROR_CODE,
            ..
        } = self
        {
            return None;
        }

        Some(ProgressEvent::Error {
            code: self.code(),
            message: self.to_string(),
        })
    }
}

impl From<SignerError> for PipelineError {
    fn from(e: SignerError) -> Self {
        match e {
            SignerError::Declined => Self::SignatureDeclined,
            SignerError::Rpc { code, message } => Self::Rpc { code, message },
            other => Self::Other(format!("{}", other)),
        }
    }
}

impl From<RelayError> for PipelineError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::Simulation { code, message } => Self::Simulation { code, message },
            RelayError::Rpc { code, message } => Self::Rpc { code, message },
            other => Self::Other(format!("{}", other)),
        }
    }
}

impl From<eyre::Report> for PipelineError {
    fn from(e: eyre::Report) -> Self {
        Self::Other(format!("{}", e))
    }
}
