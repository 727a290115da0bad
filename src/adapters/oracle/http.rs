//! HTTP position oracle.
//!
//! Reads the monitored position from a JSON endpoint:
//!
//! ```json
//! { "rangeLow": -20, "rangeHigh": 20, "marketPointer": 3, "fees": { "x": 10, "y": 4 } }
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::domain::position::{FeeAmounts, PositionSnapshot};
use crate::ports::{OracleError, PositionOracle};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionResponse {
    range_low: i32,
    range_high: i32,
    market_pointer: i32,
    #[serde(default)]
    fees: FeeAmounts,
}

impl PositionResponse {
    fn into_snapshot(self, observed_at: Timestamp) -> Result<PositionSnapshot, OracleError> {
        PositionSnapshot::new(
            self.range_low,
            self.range_high,
            self.market_pointer,
            self.fees,
            observed_at,
        )
        .map_err(|e| OracleError::InvalidResponse(e.to_string()))
    }
}

pub struct HttpPositionOracle {
    endpoint: String,
    http_client: reqwest::Client,
}

impl HttpPositionOracle {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, OracleError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::Unavailable(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            http_client,
        })
    }
}

#[async_trait]
impl PositionOracle for HttpPositionOracle {
    async fn snapshot(&self) -> Result<PositionSnapshot, OracleError> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "Position request failed");
                OracleError::Unavailable(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(endpoint = %self.endpoint, %status, "Position endpoint returned error");
            return Err(OracleError::Unavailable(format!(
                "position endpoint returned {}",
                status
            )));
        }

        let body: PositionResponse = response
            .json()
            .await
            .map_err(|e| OracleError::InvalidResponse(e.to_string()))?;

        body.into_snapshot(Timestamp::now())
    }
}
