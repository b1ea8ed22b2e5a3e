pub mod flight;
pub mod iata;
pub mod memory_repo;
pub mod offer;
pub mod repository;
pub mod search;
pub mod service;
pub mod supplier;
pub mod supplier_time;
pub mod view;

pub use flight::{FlightDraft, FlightPatch, FlightRecord, NewFlight};
pub use memory_repo::InMemoryFlightRepository;
pub use offer::ExternalFlightOffer;
pub use repository::{FlightRepository, RepositoryError};
pub use search::{Page, PageRequest, SearchFilter, TimeRange};
pub use service::FlightDomainService;
pub use supplier::{FlightSupplier, SupplierQuery, EXTERNAL_SUPPLIER_NAME};
pub use view::UnifiedFlightView;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Flight not found with ID: {0}")]
    NotFoundError(i64),
    #[error("Storage failure: {0}")]
    StorageError(#[source] RepositoryError),
}

pub type CoreResult<T> = Result<T, CoreError>;
