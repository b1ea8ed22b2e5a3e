use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::flight::{FlightRecord, NewFlight};
use crate::repository::{FlightRepository, RepositoryError};
use crate::search::{Page, SearchFilter};

/// Process-local flight store with the same contract as the Postgres one.
/// Used for `storage.backend = "memory"` and throughout the tests.
pub struct InMemoryFlightRepository {
    state: RwLock<MemoryState>,
}

struct MemoryState {
    flights: BTreeMap<i64, FlightRecord>,
    next_id: i64,
}

impl InMemoryFlightRepository {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                flights: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.flights.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryFlightRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(filter: &SearchFilter, flight: &FlightRecord) -> bool {
    filter.origin.as_deref().map_or(true, |o| flight.departure_airport == o)
        && filter.destination.as_deref().map_or(true, |d| flight.destination_airport == d)
        && filter.matches_airline(&flight.airline)
        && filter.time_range.contains(flight.departure_time, flight.arrival_time)
}

#[async_trait]
impl FlightRepository for InMemoryFlightRepository {
    async fn insert(&self, flight: &NewFlight) -> Result<FlightRecord, RepositoryError> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;

        let now = Utc::now();
        let record = FlightRecord {
            id,
            airline: flight.airline.clone(),
            supplier: flight.supplier.clone(),
            fare: flight.fare,
            departure_airport: flight.departure_airport.clone(),
            destination_airport: flight.destination_airport.clone(),
            departure_time: flight.departure_time,
            arrival_time: flight.arrival_time,
            created_at: now,
            updated_at: now,
        };
        state.flights.insert(id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<FlightRecord>, RepositoryError> {
        Ok(self.state.read().await.flights.get(&id).cloned())
    }

    async fn update(&self, flight: &FlightRecord) -> Result<FlightRecord, RepositoryError> {
        let mut state = self.state.write().await;
        let stored = state
            .flights
            .get_mut(&flight.id)
            .ok_or_else(|| format!("flight {} vanished during update", flight.id))?;

        let created_at = stored.created_at;
        *stored = FlightRecord {
            created_at,
            updated_at: Utc::now(),
            ..flight.clone()
        };
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.state.write().await.flights.remove(&id).is_some())
    }

    async fn exists(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.state.read().await.flights.contains_key(&id))
    }

    async fn search(&self, filter: &SearchFilter) -> Result<Page<FlightRecord>, RepositoryError> {
        let state = self.state.read().await;
        let mut hits: Vec<&FlightRecord> = state
            .flights
            .values()
            .filter(|f| matches(filter, f))
            .collect();
        hits.sort_by_key(|f| (f.departure_time, f.id));

        let total_elements = hits.len() as u64;
        let offset = usize::try_from(filter.page.offset()).unwrap_or(usize::MAX);
        let items = hits
            .into_iter()
            .skip(offset)
            .take(filter.page.size as usize)
            .cloned()
            .collect();

        Ok(Page {
            items,
            page: filter.page.page,
            size: filter.page.size,
            total_elements,
        })
    }

    async fn exists_with_route_and_departure(
        &self,
        airline: &str,
        departure_airport: &str,
        destination_airport: &str,
        departure_time: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        Ok(self.state.read().await.flights.values().any(|f| {
            f.airline == airline
                && f.departure_airport == departure_airport
                && f.destination_airport == destination_airport
                && f.departure_time == departure_time
        }))
    }
}
