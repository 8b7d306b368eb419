//! Human-readable translation of raw node/relay error messages.
//!
//! The terminal [`Error`](crate::ProgressEvent::Error) event carries the raw
//! message verbatim; callers that present errors to users run it through
//! [`translate`] to map known failure strings to stable phrasing. Unknown
//! messages pass through unchanged.

/// Known raw-message substrings and their human-readable versions.
const COMMON_ERRORS: &[(&str, &str)] = &[
    // user messed up manual gas values
    (
        "transaction underpriced",
        "Transaction under-priced. Please check the supplied gas amount and try again.",
    ),
    (
        "intrinsic gas too low",
        "Transaction under-priced. Please check the supplied gas amount and try again.",
    ),
    // user denied signature via the wallet
    ("User denied transaction signature", "Denied transaction signature"),
    ("User denied message signature", "Denied transaction signature"),
    // balance errors
    ("insufficient balance", "Insufficient balance"),
    // relay errors
    (
        "missing response",
        "Invalid network - Flashbots supported on Mainnet or Görli",
    ),
    (
        "invalid chain id for signer",
        "Invalid network - Flashbots supported on Mainnet or Görli",
    ),
    (
        "unsupported chain id",
        "Invalid network - Flashbots supported on Mainnet or Görli",
    ),
];

/// Map a raw error message to its human-readable version, passing unknown
/// messages through verbatim.
pub fn translate(message: &str) -> String {
    for (needle, readable) in COMMON_ERRORS {
        if message.contains(needle) {
            return (*readable).to_string();
        }
    }

    message.to_string()
}
