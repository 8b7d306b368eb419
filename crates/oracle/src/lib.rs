//! Gas price estimation for bundle transactions.
//!
//! Queries an external estimation service exposing `fast` and `rapid` tiers
//! and derives a single legacy gas price as the midpoint between the two.
//! There is deliberately no fallback price: a failed or implausible quote is
//! reported upward so the pipeline aborts instead of submitting with an
//! undefined price.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum OracleError {
    /// Network-level failure reaching the estimation endpoint.
    #[error("{0}")]
    Request(String),

    /// The endpoint answered but did not report success.
    #[error("Unable to retrieve Gas price from API, please try again.")]
    Unavailable,

    /// The endpoint reported tiers that are not strictly positive.
    #[error("Gasprice returned by API is too low, please try again.")]
    TooLow,
}

/// Response envelope of the estimation endpoint.
#[derive(Debug, Deserialize)]
struct GasPriceResponse {
    code: u32,
    data: GasTiers,
}

/// Quoted price tiers in wei.
#[derive(Debug, Deserialize)]
struct GasTiers {
    fast: u128,
    rapid: u128,
}

/// Gas price oracle bound to a fixed estimation endpoint.
#[derive(Debug, Clone)]
pub struct GasPriceOracle {
    client: reqwest::Client,
    endpoint: String,
}

impl GasPriceOracle {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Fetch the current tiers and derive the submission gas price in wei.
    ///
    /// Only a `code == 200` response with strictly positive tiers yields a
    /// price; everything else is a typed failure.
    pub async fn gas_price(&self) -> Result<u128, OracleError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| OracleError::Request(format!("{}", e)))?;

        let quote: GasPriceResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Request(format!("{}", e)))?;

        if quote.code != 200 {
            return Err(OracleError::Unavailable);
        }

        if quote.data.fast == 0 || quote.data.rapid == 0 {
            return Err(OracleError::TooLow);
        }

        let price = midpoint(quote.data.fast, quote.data.rapid);
        debug!(
            fast = quote.data.fast,
            rapid = quote.data.rapid,
            price,
            "Derived gas price"
        );

        Ok(price)
    }
}

/// Midpoint between the fast and rapid tiers: `fast + (rapid - fast) / 2`.
///
/// Quotes with `rapid < fast` collapse to `fast`.
pub const fn midpoint(fast: u128, rapid: u128) -> u128 {
    fast + rapid.saturating_sub(fast) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_between_tiers() {
        assert_eq!(midpoint(10, 20), 15);
        assert_eq!(midpoint(100, 100), 100);
        assert_eq!(midpoint(1, 2), 1);
    }

    #[test]
    fn test_midpoint_inverted_tiers_collapse_to_fast() {
        assert_eq!(midpoint(20, 10), 20);
    }

    #[tokio::test]
    async fn test_gas_price_happy_path() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gas")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":200,"data":{"fast":10,"rapid":20}}"#)
            .create_async()
            .await;

        let oracle = GasPriceOracle::new(format!("{}/gas", server.url()));
        let price = oracle.gas_price().await.expect("should derive price");
        assert_eq!(price, 15);
    }

    #[tokio::test]
    async fn test_zero_tiers_fail_instead_of_price_zero() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gas")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":200,"data":{"fast":0,"rapid":0}}"#)
            .create_async()
            .await;

        let oracle = GasPriceOracle::new(format!("{}/gas", server.url()));
        let result = oracle.gas_price().await;
        assert!(matches!(result, Err(OracleError::TooLow)));
    }

    #[tokio::test]
    async fn test_non_success_code_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gas")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":500,"data":{"fast":10,"rapid":20}}"#)
            .create_async()
            .await;

        let oracle = GasPriceOracle::new(format!("{}/gas", server.url()));
        let result = oracle.gas_price().await;
        assert!(matches!(result, Err(OracleError::Unavailable)));
    }

    #[tokio::test]
    async fn test_network_error_is_request_failure() {
        // Nothing is listening on this port.
        let oracle = GasPriceOracle::new("http://127.0.0.1:1/gas");
        let result = oracle.gas_price().await;
        assert!(matches!(result, Err(OracleError::Request(_))));
    }
}
