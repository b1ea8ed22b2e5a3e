//! Reqwest-backed adapter for the CrazySupplier search endpoint.
//!
//! Owns transport details only: request serialisation, timeout, status
//! classification, retries and payload decoding. Every failure ends as an
//! empty offer list for the caller.

use std::time::Duration;

use async_trait::async_trait;
use flightdata_core::{ExternalFlightOffer, FlightSupplier, SupplierQuery};
use reqwest::{header, Client, StatusCode};
use tracing::{debug, error, info, warn};

use crate::dto::{parse_offers, SupplierSearchRequest};
use crate::retry::RetryPolicy;
use crate::{FaultClass, SupplierError};

#[derive(Debug, Clone)]
pub struct SupplierSettings {
    pub enabled: bool,
    pub base_url: String,
    /// Per-request timeout, connect plus read.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for SupplierSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:8081".to_string(),
            timeout: Duration::from_millis(5000),
            retry: RetryPolicy::default(),
        }
    }
}

/// How a supplier search ended. Only [`SupplierOutcome::Success`] carries offers.
#[derive(Debug, Clone, PartialEq)]
pub enum SupplierOutcome {
    Success(Vec<ExternalFlightOffer>),
    Disabled,
    /// 4xx answer, not retried.
    ClientFault(StatusCode),
    /// Every allowed attempt failed with a retryable fault.
    Exhausted { attempts: u32 },
    Unexpected,
}

impl SupplierOutcome {
    pub fn into_offers(self) -> Vec<ExternalFlightOffer> {
        match self {
            SupplierOutcome::Success(offers) => offers,
            _ => Vec::new(),
        }
    }
}

pub struct CrazySupplierClient {
    client: Client,
    endpoint: String,
    settings: SupplierSettings,
}

impl CrazySupplierClient {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(settings: SupplierSettings) -> Result<Self, reqwest::Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout)
            .default_headers(headers)
            .build()?;
        let endpoint = format!("{}/flights", settings.base_url.trim_end_matches('/'));

        info!(
            enabled = settings.enabled,
            endpoint = %endpoint,
            timeout_ms = settings.timeout.as_millis() as u64,
            max_attempts = settings.retry.max_attempts,
            "CrazySupplier client configured"
        );

        Ok(Self {
            client,
            endpoint,
            settings,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs the search with retries and reports how it ended.
    pub async fn execute(&self, query: &SupplierQuery) -> SupplierOutcome {
        if !self.settings.enabled {
            debug!("CrazySupplier disabled, skipping search");
            return SupplierOutcome::Disabled;
        }

        let request = SupplierSearchRequest::from(query);
        let policy = &self.settings.retry;
        let mut attempt = 1;

        loop {
            debug!(attempt, from = %request.from, to = %request.to, "Calling CrazySupplier");
            let err = match self.attempt(&request).await {
                Ok(offers) => {
                    info!(count = offers.len(), attempt, "CrazySupplier returned offers");
                    return SupplierOutcome::Success(offers);
                }
                Err(err) => err,
            };

            match err.class() {
                FaultClass::ClientFault => {
                    warn!(error = %err, "CrazySupplier rejected the request, not retrying");
                    return match err {
                        SupplierError::Client(status) => SupplierOutcome::ClientFault(status),
                        _ => SupplierOutcome::Unexpected,
                    };
                }
                FaultClass::Unexpected => {
                    error!(error = %err, "CrazySupplier call failed unexpectedly");
                    return SupplierOutcome::Unexpected;
                }
                FaultClass::Retryable if policy.can_retry(attempt) => {
                    let delay = policy.delay_after(attempt);
                    warn!(
                        error = %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "CrazySupplier call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                FaultClass::Retryable => {
                    error!(error = %err, attempts = attempt, "CrazySupplier retries exhausted");
                    return SupplierOutcome::Exhausted { attempts: attempt };
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: &SupplierSearchRequest,
    ) -> Result<Vec<ExternalFlightOffer>, SupplierError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(status));
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        let decoded = parse_offers(body.as_ref())
            .map_err(|e| SupplierError::Decode(format!("invalid CrazySupplier JSON payload: {e}")))?;

        let received = decoded.len();
        let offers: Vec<ExternalFlightOffer> = decoded
            .into_iter()
            .map(ExternalFlightOffer::from)
            .filter(ExternalFlightOffer::is_valid)
            .collect();

        let dropped = received - offers.len();
        if dropped > 0 {
            warn!(dropped, received, "Discarded invalid CrazySupplier offers");
        }
        Ok(offers)
    }
}

fn map_transport_error(error: reqwest::Error) -> SupplierError {
    if error.is_timeout() {
        SupplierError::Timeout(error.to_string())
    } else {
        SupplierError::Transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode) -> SupplierError {
    if status.is_client_error() {
        SupplierError::Client(status)
    } else if status.is_server_error() {
        SupplierError::Server(status)
    } else {
        SupplierError::UnexpectedStatus(status)
    }
}

#[async_trait]
impl FlightSupplier for CrazySupplierClient {
    fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    async fn search_offers(
        &self,
        query: &SupplierQuery,
    ) -> Result<Vec<ExternalFlightOffer>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.execute(query).await.into_offers())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_settings(base_url: String) -> SupplierSettings {
        SupplierSettings {
            enabled: true,
            base_url,
            timeout: Duration::from_secs(2),
            retry: RetryPolicy {
                max_attempts: 3,
                initial_delay: Duration::from_millis(10),
                multiplier: 2.0,
                max_delay: Duration::from_millis(50),
            },
        }
    }

    fn query() -> SupplierQuery {
        SupplierQuery {
            origin: "JFK".to_string(),
            destination: "LAX".to_string(),
            outbound_date: NaiveDate::from_ymd_opt(2025, 10, 25).unwrap(),
            inbound_date: NaiveDate::from_ymd_opt(2025, 10, 26).unwrap(),
        }
    }

    fn lufthansa() -> serde_json::Value {
        json!({
            "carrier": "Lufthansa",
            "basePrice": 250.0,
            "tax": 50.0,
            "departureAirportName": "JFK",
            "arrivalAirportName": "LAX",
            "outboundDateTime": "2025-10-25T14:00:00",
            "inboundDateTime": "2025-10-25T20:15:00"
        })
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client =
            CrazySupplierClient::new(fast_settings("http://supplier.local/".to_string())).unwrap();
        assert_eq!(client.endpoint(), "http://supplier.local/flights");
    }

    #[tokio::test]
    async fn test_success_sends_expected_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flights"))
            .and(body_json(json!({
                "from": "JFK",
                "to": "LAX",
                "outboundDate": "2025-10-25",
                "inboundDate": "2025-10-26"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([lufthansa()])))
            .expect(1)
            .mount(&server)
            .await;

        let client = CrazySupplierClient::new(fast_settings(server.uri())).unwrap();
        let offers = client.search_offers(&query()).await.unwrap();

        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].carrier.as_deref(), Some("Lufthansa"));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flights"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let client = CrazySupplierClient::new(fast_settings(server.uri())).unwrap();
        let outcome = client.execute(&query()).await;

        assert_eq!(outcome, SupplierOutcome::ClientFault(StatusCode::BAD_REQUEST));
        assert!(outcome.into_offers().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_exhausts_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flights"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let client = CrazySupplierClient::new(fast_settings(server.uri())).unwrap();
        let outcome = client.execute(&query()).await;

        assert_eq!(outcome, SupplierOutcome::Exhausted { attempts: 3 });
        assert!(outcome.into_offers().is_empty());
    }

    #[tokio::test]
    async fn test_retries_wait_with_increasing_backoff() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flights"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let settings = SupplierSettings {
            retry: RetryPolicy {
                max_attempts: 3,
                initial_delay: Duration::from_millis(200),
                multiplier: 2.0,
                max_delay: Duration::from_millis(300),
            },
            ..fast_settings(server.uri())
        };
        let client = CrazySupplierClient::new(settings).unwrap();

        let started = std::time::Instant::now();
        let outcome = client.execute(&query()).await;
        let elapsed = started.elapsed();

        assert_eq!(outcome, SupplierOutcome::Exhausted { attempts: 3 });
        // 200ms, then 400ms capped to 300ms; no sleep after the last attempt.
        assert!(elapsed >= Duration::from_millis(500), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(700 + 1500), "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn test_server_error_then_success_recovers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flights"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/flights"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([lufthansa()])))
            .expect(1)
            .mount(&server)
            .await;

        let client = CrazySupplierClient::new(fast_settings(server.uri())).unwrap();
        let offers = client.execute(&query()).await.into_offers();
        assert_eq!(offers.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_supplier_is_retried_then_empty() {
        // Nothing listens on port 1.
        let client = CrazySupplierClient::new(fast_settings("http://127.0.0.1:1".to_string())).unwrap();
        let outcome = client.execute(&query()).await;
        assert_eq!(outcome, SupplierOutcome::Exhausted { attempts: 3 });
    }

    #[tokio::test]
    async fn test_invalid_offers_are_filtered() {
        let mut negative_tax = lufthansa();
        negative_tax["tax"] = json!(-5.0);
        let mut backwards = lufthansa();
        backwards["inboundDateTime"] = json!("2025-10-25T10:00:00");
        let missing_carrier = json!({ "basePrice": 100.0, "tax": 10.0 });

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flights"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                lufthansa(),
                negative_tax,
                backwards,
                missing_carrier
            ])))
            .mount(&server)
            .await;

        let client = CrazySupplierClient::new(fast_settings(server.uri())).unwrap();
        let offers = client.execute(&query()).await.into_offers();

        assert_eq!(offers.len(), 1);
        assert!(offers.iter().all(ExternalFlightOffer::is_valid));
    }

    #[tokio::test]
    async fn test_null_body_is_empty_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flights"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let client = CrazySupplierClient::new(fast_settings(server.uri())).unwrap();
        assert_eq!(client.execute(&query()).await, SupplierOutcome::Success(Vec::new()));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flights"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .expect(1)
            .mount(&server)
            .await;

        let client = CrazySupplierClient::new(fast_settings(server.uri())).unwrap();
        assert_eq!(client.execute(&query()).await, SupplierOutcome::Unexpected);
    }

    #[tokio::test]
    async fn test_disabled_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([lufthansa()])))
            .expect(0)
            .mount(&server)
            .await;

        let settings = SupplierSettings {
            enabled: false,
            ..fast_settings(server.uri())
        };
        let client = CrazySupplierClient::new(settings).unwrap();

        assert!(!client.is_enabled());
        assert_eq!(client.execute(&query()).await, SupplierOutcome::Disabled);
    }
}
