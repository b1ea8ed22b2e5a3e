use async_trait::async_trait;
use chrono::NaiveDate;

use crate::offer::ExternalFlightOffer;

/// Label stamped on every flight that comes from the external provider.
pub const EXTERNAL_SUPPLIER_NAME: &str = "CrazySupplier";

/// Route and calendar dates sent to the external supplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierQuery {
    pub origin: String,
    pub destination: String,
    pub outbound_date: NaiveDate,
    pub inbound_date: NaiveDate,
}

#[async_trait]
pub trait FlightSupplier: Send + Sync {
    /// Administrative switch. A disabled supplier is skipped, not treated as failed.
    fn is_enabled(&self) -> bool;

    /// Search the supplier for offers on a route.
    ///
    /// Implementations are expected to absorb their own faults and return an
    /// empty list; callers still treat an `Err` as "no offers".
    async fn search_offers(
        &self,
        query: &SupplierQuery,
    ) -> Result<Vec<ExternalFlightOffer>, Box<dyn std::error::Error + Send + Sync>>;
}
