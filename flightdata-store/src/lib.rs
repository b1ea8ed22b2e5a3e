pub mod app_config;
pub mod database;
pub mod flight_repo;

pub use app_config::Config;
pub use database::DbClient;
pub use flight_repo::PostgresFlightRepository;
