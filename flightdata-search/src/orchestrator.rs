use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use flightdata_core::search::{airline_matches, total_pages};
use flightdata_core::supplier_time::{supplier_date_of, supplier_today};
use flightdata_core::{
    CoreResult, FlightDomainService, FlightSupplier, PageRequest, SearchFilter, SupplierQuery,
    TimeRange, UnifiedFlightView,
};
use futures_util::FutureExt;
use serde::Serialize;
use tracing::{debug, error, info};

// ============================================================================
// Request / Response
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightSearchQuery {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub airline: Option<String>,
    pub time_range: TimeRange,
    pub page: PageRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: u32,
    pub page_size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchResult {
    pub flights: Vec<UnifiedFlightView>,
    pub pagination: PaginationInfo,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Merges one page of stored flights with whatever the supplier offers for
/// the same route. Only a storage failure can fail a search.
pub struct FlightSearchOrchestrator {
    domain: Arc<FlightDomainService>,
    supplier: Arc<dyn FlightSupplier>,
}

impl FlightSearchOrchestrator {
    pub fn new(domain: Arc<FlightDomainService>, supplier: Arc<dyn FlightSupplier>) -> Self {
        Self { domain, supplier }
    }

    pub async fn search_flights(&self, query: FlightSearchQuery) -> CoreResult<FlightSearchResult> {
        let filter = SearchFilter {
            origin: query.origin,
            destination: query.destination,
            airline: query.airline,
            time_range: query.time_range,
            page: query.page,
        }
        .normalized();

        let stored = self.domain.search_flights(filter.clone()).await?;
        let mut flights: Vec<UnifiedFlightView> =
            stored.items.iter().map(UnifiedFlightView::from_stored).collect();
        let stored_count = flights.len();

        if let Some(supplier_query) = self.supplier_query(&filter) {
            flights.extend(self.supplier_flights(&supplier_query, filter.airline.as_deref()).await);
        }

        // Totals describe the merged list, not the stored catalogue.
        let total_elements = flights.len() as u64;
        let pagination = PaginationInfo {
            current_page: stored.page,
            page_size: stored.size,
            total_elements,
            total_pages: total_pages(total_elements, stored.size),
        };

        info!(
            stored = stored_count,
            external = flights.len() - stored_count,
            page = pagination.current_page,
            "Flight search completed"
        );
        Ok(FlightSearchResult { flights, pagination })
    }

    /// `None` when the supplier is switched off or the route is incomplete.
    fn supplier_query(&self, filter: &SearchFilter) -> Option<SupplierQuery> {
        if !self.supplier.is_enabled() {
            debug!("Supplier disabled, searching stored flights only");
            return None;
        }
        let (origin, destination) = match (&filter.origin, &filter.destination) {
            (Some(origin), Some(destination)) => (origin.clone(), destination.clone()),
            _ => {
                debug!("No complete route, supplier not queried");
                return None;
            }
        };

        let (outbound_date, inbound_date) = supplier_dates(&filter.time_range, supplier_today());
        Some(SupplierQuery {
            origin,
            destination,
            outbound_date,
            inbound_date,
        })
    }

    /// Supplier offers as views, airline-filtered. Errors and panics from the
    /// supplier contribute nothing.
    async fn supplier_flights(
        &self,
        query: &SupplierQuery,
        airline: Option<&str>,
    ) -> Vec<UnifiedFlightView> {
        let step = async {
            let offers = self.supplier.search_offers(query).await?;
            let received = offers.len();
            let views: Vec<UnifiedFlightView> = offers
                .iter()
                .filter_map(UnifiedFlightView::from_external)
                .filter(|view| airline_matches(airline, &view.airline))
                .collect();
            debug!(received, kept = views.len(), "Supplier offers mapped");
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(views)
        };

        match AssertUnwindSafe(step).catch_unwind().await {
            Ok(Ok(views)) => views,
            Ok(Err(e)) => {
                error!(error = %e, "Supplier search failed, continuing with stored flights");
                Vec::new()
            }
            Err(_) => {
                error!("Supplier search panicked, continuing with stored flights");
                Vec::new()
            }
        }
    }
}

/// Outbound and inbound calendar dates for the supplier, in its own zone.
///
/// Outbound comes from `departure_from`, else `today`. Inbound comes from
/// `arrival_to`, else the day after outbound.
pub fn supplier_dates(range: &TimeRange, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let outbound = range.departure_from.map(supplier_date_of).unwrap_or(today);
    let inbound = range
        .arrival_to
        .map(supplier_date_of)
        .unwrap_or_else(|| outbound.checked_add_days(Days::new(1)).unwrap_or(outbound));
    (outbound, inbound)
}
