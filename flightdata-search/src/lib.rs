//! Combined search over stored flights and the external supplier.

pub mod orchestrator;

pub use orchestrator::{
    supplier_dates, FlightSearchOrchestrator, FlightSearchQuery, FlightSearchResult,
    PaginationInfo,
};
