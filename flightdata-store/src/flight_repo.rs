use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flightdata_core::repository::{FlightRepository, RepositoryError};
use flightdata_core::{FlightRecord, NewFlight, Page, SearchFilter};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

const FLIGHT_COLUMNS: &str = "id, airline, supplier, fare, departure_airport, destination_airport, \
     departure_time, arrival_time, created_at, updated_at";

pub struct PostgresFlightRepository {
    pool: PgPool,
}

impl PostgresFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct FlightRow {
    id: i64,
    airline: String,
    supplier: String,
    fare: Decimal,
    departure_airport: String,
    destination_airport: String,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FlightRow> for FlightRecord {
    fn from(row: FlightRow) -> Self {
        Self {
            id: row.id,
            airline: row.airline,
            supplier: row.supplier,
            fare: row.fare,
            departure_airport: row.departure_airport,
            destination_airport: row.destination_airport,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Escapes `%`, `_` and the escape character itself for a LIKE pattern.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_filters(qb: &mut QueryBuilder<'static, Postgres>, filter: &SearchFilter) {
    qb.push(" WHERE 1=1");

    if let Some(origin) = &filter.origin {
        qb.push(" AND departure_airport = ").push_bind(origin.clone());
    }
    if let Some(destination) = &filter.destination {
        qb.push(" AND destination_airport = ").push_bind(destination.clone());
    }
    if let Some(airline) = &filter.airline {
        qb.push(" AND airline ILIKE ")
            .push_bind(format!("%{}%", escape_like(airline)));
    }

    let range = &filter.time_range;
    if let Some(from) = range.departure_from {
        qb.push(" AND departure_time >= ").push_bind(from);
    }
    if let Some(to) = range.departure_to {
        qb.push(" AND departure_time <= ").push_bind(to);
    }
    if let Some(from) = range.arrival_from {
        qb.push(" AND arrival_time >= ").push_bind(from);
    }
    if let Some(to) = range.arrival_to {
        qb.push(" AND arrival_time <= ").push_bind(to);
    }
}

fn search_query(filter: &SearchFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {FLIGHT_COLUMNS} FROM flights"));
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY departure_time ASC, id ASC LIMIT ")
        .push_bind(i64::from(filter.page.size))
        .push(" OFFSET ")
        .push_bind(i64::try_from(filter.page.offset()).unwrap_or(i64::MAX));
    qb
}

fn count_query(filter: &SearchFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM flights");
    push_filters(&mut qb, filter);
    qb
}

#[async_trait]
impl FlightRepository for PostgresFlightRepository {
    async fn insert(&self, flight: &NewFlight) -> Result<FlightRecord, RepositoryError> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            r#"
            INSERT INTO flights (airline, supplier, fare, departure_airport, destination_airport, departure_time, arrival_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {FLIGHT_COLUMNS}
            "#
        ))
        .bind(&flight.airline)
        .bind(&flight.supplier)
        .bind(flight.fare)
        .bind(&flight.departure_airport)
        .bind(&flight.destination_airport)
        .bind(flight.departure_time)
        .bind(flight.arrival_time)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<FlightRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(FlightRecord::from))
    }

    async fn update(&self, flight: &FlightRecord) -> Result<FlightRecord, RepositoryError> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            r#"
            UPDATE flights
            SET airline = $1, supplier = $2, fare = $3, departure_airport = $4,
                destination_airport = $5, departure_time = $6, arrival_time = $7,
                updated_at = NOW()
            WHERE id = $8
            RETURNING {FLIGHT_COLUMNS}
            "#
        ))
        .bind(&flight.airline)
        .bind(&flight.supplier)
        .bind(flight.fare)
        .bind(&flight.departure_airport)
        .bind(&flight.destination_airport)
        .bind(flight.departure_time)
        .bind(flight.arrival_time)
        .bind(flight.id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(FlightRecord::from)
            .ok_or_else(|| format!("flight {} vanished during update", flight.id).into())
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM flights WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, id: i64) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM flights WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn search(&self, filter: &SearchFilter) -> Result<Page<FlightRecord>, RepositoryError> {
        let rows: Vec<FlightRow> = search_query(filter)
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = count_query(filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok(Page {
            items: rows.into_iter().map(FlightRecord::from).collect(),
            page: filter.page.page,
            size: filter.page.size,
            total_elements: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn exists_with_route_and_departure(
        &self,
        airline: &str,
        departure_airport: &str,
        destination_airport: &str,
        departure_time: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM flights
                WHERE airline = $1 AND departure_airport = $2
                  AND destination_airport = $3 AND departure_time = $4
            )
            "#,
        )
        .bind(airline)
        .bind(departure_airport)
        .bind(destination_airport)
        .bind(departure_time)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
