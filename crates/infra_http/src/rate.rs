//! Rate table lookups against the policy backend

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, PortError};
use domain_policy::{RateKey, RateLookup};

use crate::client::ApiClient;

#[derive(Debug, Deserialize)]
struct RateEnvelope {
    data: Option<RateData>,
}

#[derive(Debug, Deserialize)]
struct RateData {
    rate: Option<Decimal>,
}

/// [`RateLookup`] backed by `GET /api/get-rate/{projectCode}/{rateCode}`
///
/// A 404 or a response without `data.rate` means the table has no entry.
#[derive(Debug, Clone)]
pub struct HttpRateLookup {
    client: ApiClient,
}

impl HttpRateLookup {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Endpoint segments; the client percent-encodes each one
    pub fn segments_for(key: &RateKey) -> [String; 4] {
        [
            "api".to_string(),
            "get-rate".to_string(),
            key.project_code.to_string(),
            key.rate_code().to_string(),
        ]
    }
}

impl DomainPort for HttpRateLookup {}

#[async_trait]
impl RateLookup for HttpRateLookup {
    #[instrument(skip(self), fields(project_code = %key.project_code, rate_code = %key.rate_code()))]
    async fn lookup_rate(&self, key: &RateKey) -> Result<Option<Decimal>, PortError> {
        let segments = Self::segments_for(key);
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        let envelope: RateEnvelope = match self.client.get_json_segments(&segments).await {
            Ok(envelope) => envelope,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        let rate = envelope.data.and_then(|d| d.rate);
        debug!(?rate, "Rate fetched");
        Ok(rate)
    }
}
