use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::flight::{FlightDraft, FlightPatch, FlightRecord, NewFlight};
use crate::iata::normalize_airport_code;
use crate::repository::FlightRepository;
use crate::search::{Page, SearchFilter};
use crate::{CoreError, CoreResult};

/// Lifecycle and search rules for stored flights.
pub struct FlightDomainService {
    repo: Arc<dyn FlightRepository>,
}

impl FlightDomainService {
    pub fn new(repo: Arc<dyn FlightRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_flight(&self, draft: FlightDraft) -> CoreResult<FlightRecord> {
        let flight = NewFlight::create(draft)?;
        debug!(
            airline = %flight.airline,
            from = %flight.departure_airport,
            to = %flight.destination_airport,
            "Creating new flight"
        );

        let saved = self.repo.insert(&flight).await.map_err(CoreError::StorageError)?;
        info!(id = saved.id, "Flight created");
        Ok(saved)
    }

    pub async fn update_flight(&self, id: i64, patch: FlightPatch) -> CoreResult<FlightRecord> {
        debug!(id, "Updating flight");
        let mut flight = self.get_flight(id).await?;
        flight.apply_patch(patch)?;

        let updated = self.repo.update(&flight).await.map_err(CoreError::StorageError)?;
        info!(id = updated.id, "Flight updated");
        Ok(updated)
    }

    pub async fn delete_flight(&self, id: i64) -> CoreResult<()> {
        debug!(id, "Deleting flight");
        if !self.repo.exists(id).await.map_err(CoreError::StorageError)? {
            return Err(CoreError::NotFoundError(id));
        }

        // A concurrent delete between the check and here still reports not-found.
        if !self.repo.delete(id).await.map_err(CoreError::StorageError)? {
            return Err(CoreError::NotFoundError(id));
        }
        info!(id, "Flight deleted");
        Ok(())
    }

    pub async fn get_flight(&self, id: i64) -> CoreResult<FlightRecord> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(CoreError::StorageError)?
            .ok_or(CoreError::NotFoundError(id))
    }

    /// Stored-flight search ordered by departure time. Airport codes are
    /// uppercased first; the page size is taken as given.
    pub async fn search_flights(&self, filter: SearchFilter) -> CoreResult<Page<FlightRecord>> {
        let filter = filter.normalized();
        debug!(
            origin = ?filter.origin,
            destination = ?filter.destination,
            airline = ?filter.airline,
            page = filter.page.page,
            size = filter.page.size,
            "Searching stored flights"
        );
        self.repo.search(&filter).await.map_err(CoreError::StorageError)
    }

    /// Same airline, same route and same departure instant.
    pub async fn is_duplicate_flight(
        &self,
        airline: &str,
        departure_airport: &str,
        destination_airport: &str,
        departure_time: DateTime<Utc>,
    ) -> CoreResult<bool> {
        self.repo
            .exists_with_route_and_departure(
                airline,
                &normalize_airport_code(departure_airport),
                &normalize_airport_code(destination_airport),
                departure_time,
            )
            .await
            .map_err(CoreError::StorageError)
    }
}
