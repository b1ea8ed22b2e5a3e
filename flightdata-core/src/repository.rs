use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::flight::{FlightRecord, NewFlight};
use crate::search::{Page, SearchFilter};

pub type RepositoryError = Box<dyn std::error::Error + Send + Sync>;

/// Repository trait for flight data access.
///
/// Implementations own `id`, `created_at` and `updated_at`.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn insert(&self, flight: &NewFlight) -> Result<FlightRecord, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<FlightRecord>, RepositoryError>;

    /// Persist every client-controlled field of `flight` and refresh `updated_at`.
    async fn update(&self, flight: &FlightRecord) -> Result<FlightRecord, RepositoryError>;

    /// Returns `false` when no row had that id.
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;

    async fn exists(&self, id: i64) -> Result<bool, RepositoryError>;

    /// AND-combined filter, ordered by departure time ascending (id breaks
    /// ties), paginated by `filter.page`. Airport codes are compared exactly;
    /// callers uppercase them first.
    async fn search(&self, filter: &SearchFilter) -> Result<Page<FlightRecord>, RepositoryError>;

    async fn exists_with_route_and_departure(
        &self,
        airline: &str,
        departure_airport: &str,
        destination_airport: &str,
        departure_time: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;
}
