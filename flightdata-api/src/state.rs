use std::sync::Arc;
use std::time::Duration;

use flightdata_core::{FlightDomainService, FlightRepository, FlightSupplier};
use flightdata_search::FlightSearchOrchestrator;
use flightdata_store::app_config::{SearchConfig, SupplierConfig};
use flightdata_supplier::{RetryPolicy, SupplierSettings};

#[derive(Clone)]
pub struct AppState {
    pub flights: Arc<FlightDomainService>,
    pub search: Arc<FlightSearchOrchestrator>,
    pub paging: SearchConfig,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn FlightRepository>,
        supplier: Arc<dyn FlightSupplier>,
        paging: SearchConfig,
    ) -> Self {
        let flights = Arc::new(FlightDomainService::new(repo));
        let search = Arc::new(FlightSearchOrchestrator::new(flights.clone(), supplier));
        Self {
            flights,
            search,
            paging,
        }
    }

    /// Requested size, or the default, clamped into `[1, max_page_size]`.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        let max = self.paging.max_page_size.max(1);
        requested
            .unwrap_or(self.paging.default_page_size)
            .clamp(1, max)
    }
}

pub fn supplier_settings(config: &SupplierConfig) -> SupplierSettings {
    SupplierSettings {
        enabled: config.enabled,
        base_url: config.base_url.clone(),
        timeout: Duration::from_millis(config.timeout_ms),
        retry: RetryPolicy {
            max_attempts: config.max_attempts,
            initial_delay: Duration::from_millis(config.initial_backoff_ms),
            multiplier: config.backoff_multiplier,
            max_delay: Duration::from_millis(config.max_backoff_ms),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flightdata_core::InMemoryFlightRepository;
    use flightdata_supplier::CrazySupplierClient;

    fn state(paging: SearchConfig) -> AppState {
        let settings = SupplierSettings {
            enabled: false,
            ..SupplierSettings::default()
        };
        AppState::new(
            Arc::new(InMemoryFlightRepository::new()),
            Arc::new(CrazySupplierClient::new(settings).unwrap()),
            paging,
        )
    }

    #[test]
    fn test_page_size_defaults_and_clamps() {
        let state = state(SearchConfig::default());
        assert_eq!(state.page_size(None), 20);
        assert_eq!(state.page_size(Some(0)), 1);
        assert_eq!(state.page_size(Some(35)), 35);
        assert_eq!(state.page_size(Some(5000)), 100);
    }

    #[test]
    fn test_page_size_with_degenerate_max() {
        let state = state(SearchConfig {
            default_page_size: 20,
            max_page_size: 0,
        });
        assert_eq!(state.page_size(None), 1);
    }

    #[test]
    fn test_supplier_settings_mapping() {
        let settings = supplier_settings(&SupplierConfig::default());
        assert!(settings.enabled);
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.retry, RetryPolicy::default());
    }
}
