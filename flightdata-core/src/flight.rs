use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::iata::{is_valid_airport_code, normalize_airport_code};
use crate::{CoreError, CoreResult};

pub const MAX_AIRLINE_LEN: usize = 100;
pub const MAX_SUPPLIER_LEN: usize = 100;
/// Fares are stored as `NUMERIC(12, 2)`.
pub const FARE_SCALE: u32 = 2;
pub const MAX_FARE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, FARE_SCALE);

/// A flight persisted in the backing store.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    pub id: i64,
    pub airline: String,
    pub supplier: String,
    pub fare: Decimal,
    pub departure_airport: String,
    pub destination_airport: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw create input. Every field is optional here so that missing values are
/// reported together with the other violations instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDraft {
    pub airline: Option<String>,
    pub supplier: Option<String>,
    pub fare: Option<Decimal>,
    pub departure_airport: Option<String>,
    pub destination_airport: Option<String>,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
}

/// A validated flight that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFlight {
    pub airline: String,
    pub supplier: String,
    pub fare: Decimal,
    pub departure_airport: String,
    pub destination_airport: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
}

/// Partial update. `None` leaves the stored value untouched; it never clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPatch {
    pub airline: Option<String>,
    pub supplier: Option<String>,
    pub fare: Option<Decimal>,
    pub departure_airport: Option<String>,
    pub destination_airport: Option<String>,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
}

impl NewFlight {
    /// Validated factory. Airport codes are uppercased before the pattern check.
    pub fn create(draft: FlightDraft) -> CoreResult<Self> {
        let mut missing = Vec::new();
        if draft.airline.as_deref().map_or(true, |a| a.trim().is_empty()) {
            missing.push("Airline is required".to_string());
        }
        if draft.supplier.as_deref().map_or(true, |s| s.trim().is_empty()) {
            missing.push("Supplier is required".to_string());
        }
        if draft.fare.is_none() {
            missing.push("Fare is required".to_string());
        }
        if draft.departure_airport.is_none() {
            missing.push("Departure airport is required".to_string());
        }
        if draft.destination_airport.is_none() {
            missing.push("Destination airport is required".to_string());
        }
        if draft.departure_time.is_none() {
            missing.push("Departure time is required".to_string());
        }
        if draft.arrival_time.is_none() {
            missing.push("Arrival time is required".to_string());
        }

        match draft {
            FlightDraft {
                airline: Some(airline),
                supplier: Some(supplier),
                fare: Some(fare),
                departure_airport: Some(departure_airport),
                destination_airport: Some(destination_airport),
                departure_time: Some(departure_time),
                arrival_time: Some(arrival_time),
            } if missing.is_empty() => {
                let flight = NewFlight {
                    airline,
                    supplier,
                    fare,
                    departure_airport: normalize_airport_code(&departure_airport),
                    destination_airport: normalize_airport_code(&destination_airport),
                    departure_time,
                    arrival_time,
                };
                flight.fields().validate()?;
                Ok(flight)
            }
            _ => Err(CoreError::ValidationError(missing.join(", "))),
        }
    }

    fn fields(&self) -> FlightFields<'_> {
        FlightFields {
            airline: &self.airline,
            supplier: &self.supplier,
            fare: self.fare,
            departure_airport: &self.departure_airport,
            destination_airport: &self.destination_airport,
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
        }
    }
}

impl FlightPatch {
    pub fn is_empty(&self) -> bool {
        self.airline.is_none()
            && self.supplier.is_none()
            && self.fare.is_none()
            && self.departure_airport.is_none()
            && self.destination_airport.is_none()
            && self.departure_time.is_none()
            && self.arrival_time.is_none()
    }
}

impl FlightRecord {
    /// Overlays the supplied fields and re-validates the whole record.
    /// On failure the record is left exactly as it was.
    pub fn apply_patch(&mut self, patch: FlightPatch) -> CoreResult<()> {
        let mut next = self.clone();
        if let Some(airline) = patch.airline {
            next.airline = airline;
        }
        if let Some(supplier) = patch.supplier {
            next.supplier = supplier;
        }
        if let Some(fare) = patch.fare {
            next.fare = fare;
        }
        if let Some(code) = patch.departure_airport {
            next.departure_airport = normalize_airport_code(&code);
        }
        if let Some(code) = patch.destination_airport {
            next.destination_airport = normalize_airport_code(&code);
        }
        if let Some(time) = patch.departure_time {
            next.departure_time = time;
        }
        if let Some(time) = patch.arrival_time {
            next.arrival_time = time;
        }

        next.fields().validate()?;
        *self = next;
        Ok(())
    }

    fn fields(&self) -> FlightFields<'_> {
        FlightFields {
            airline: &self.airline,
            supplier: &self.supplier,
            fare: self.fare,
            departure_airport: &self.departure_airport,
            destination_airport: &self.destination_airport,
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
        }
    }
}

/// Borrowed view of the client-controlled fields, shared by create and update.
struct FlightFields<'a> {
    airline: &'a str,
    supplier: &'a str,
    fare: Decimal,
    departure_airport: &'a str,
    destination_airport: &'a str,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
}

impl FlightFields<'_> {
    fn validate(&self) -> CoreResult<()> {
        let mut violations = Vec::new();

        if self.airline.trim().is_empty() {
            violations.push("Airline is required".to_string());
        } else if self.airline.chars().count() > MAX_AIRLINE_LEN {
            violations.push(format!("Airline must be at most {MAX_AIRLINE_LEN} characters"));
        }
        if self.supplier.trim().is_empty() {
            violations.push("Supplier is required".to_string());
        } else if self.supplier.chars().count() > MAX_SUPPLIER_LEN {
            violations.push(format!("Supplier must be at most {MAX_SUPPLIER_LEN} characters"));
        }
        if self.fare < Decimal::ZERO {
            violations.push("Fare cannot be negative".to_string());
        } else if self.fare > MAX_FARE {
            violations.push(format!("Fare cannot exceed {MAX_FARE}"));
        }
        if self.fare.normalize().scale() > FARE_SCALE {
            violations.push(format!("Fare must have at most {FARE_SCALE} decimal places"));
        }
        if !is_valid_airport_code(self.departure_airport) {
            violations.push("Departure airport must be a 3-letter code".to_string());
        }
        if !is_valid_airport_code(self.destination_airport) {
            violations.push("Destination airport must be a 3-letter code".to_string());
        }
        if self.departure_airport == self.destination_airport {
            violations.push("Departure and destination airports cannot be the same".to_string());
        }
        if self.arrival_time <= self.departure_time {
            violations.push("Arrival time must be after departure time".to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(CoreError::ValidationError(violations.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft() -> FlightDraft {
        FlightDraft {
            airline: Some("American Airlines".to_string()),
            supplier: Some("GlobalSupplier".to_string()),
            fare: Some(Decimal::new(29999, 2)),
            departure_airport: Some("jfk".to_string()),
            destination_airport: Some("Lax".to_string()),
            departure_time: Some(Utc.with_ymd_and_hms(2025, 10, 25, 10, 30, 0).unwrap()),
            arrival_time: Some(Utc.with_ymd_and_hms(2025, 10, 25, 16, 45, 0).unwrap()),
        }
    }

    fn record() -> FlightRecord {
        let flight = NewFlight::create(draft()).unwrap();
        let now = Utc::now();
        FlightRecord {
            id: 1,
            airline: flight.airline,
            supplier: flight.supplier,
            fare: flight.fare,
            departure_airport: flight.departure_airport,
            destination_airport: flight.destination_airport,
            departure_time: flight.departure_time,
            arrival_time: flight.arrival_time,
            created_at: now,
            updated_at: now,
        }
    }

    fn validation_message(err: CoreError) -> String {
        match err {
            CoreError::ValidationError(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_uppercases_airports() {
        let flight = NewFlight::create(draft()).unwrap();
        assert_eq!(flight.departure_airport, "JFK");
        assert_eq!(flight.destination_airport, "LAX");
    }

    #[test]
    fn test_create_reports_all_missing_fields() {
        let err = NewFlight::create(FlightDraft::default()).unwrap_err();
        let msg = validation_message(err);
        assert!(msg.contains("Airline is required"));
        assert!(msg.contains("Supplier is required"));
        assert!(msg.contains("Fare is required"));
        assert!(msg.contains("Arrival time is required"));
    }

    #[test]
    fn test_create_rejects_business_rule_violations() {
        let mut bad = draft();
        bad.fare = Some(Decimal::new(-1, 0));
        bad.destination_airport = Some("JFK".to_string());
        bad.arrival_time = bad.departure_time;

        let msg = validation_message(NewFlight::create(bad).unwrap_err());
        assert!(msg.contains("Fare cannot be negative"));
        assert!(msg.contains("cannot be the same"));
        assert!(msg.contains("Arrival time must be after departure time"));
    }

    #[test]
    fn test_create_rejects_malformed_airport() {
        let mut bad = draft();
        bad.departure_airport = Some("JF1".to_string());
        let msg = validation_message(NewFlight::create(bad).unwrap_err());
        assert!(msg.contains("Departure airport must be a 3-letter code"));
    }

    #[test]
    fn test_create_rejects_long_airline() {
        let mut bad = draft();
        bad.airline = Some("A".repeat(MAX_AIRLINE_LEN + 1));
        assert!(NewFlight::create(bad).is_err());
    }

    #[test]
    fn test_fare_above_column_range_is_rejected() {
        let mut bad = draft();
        bad.fare = Some(Decimal::from(100_000_000_000i64));
        let msg = validation_message(NewFlight::create(bad).unwrap_err());
        assert!(msg.contains("Fare cannot exceed 9999999999.99"));

        let mut edge = draft();
        edge.fare = Some(MAX_FARE);
        assert!(NewFlight::create(edge).is_ok());
    }

    #[test]
    fn test_fare_with_more_than_two_decimals_is_rejected() {
        let mut bad = draft();
        bad.fare = Some(Decimal::new(299_999, 3));
        let msg = validation_message(NewFlight::create(bad).unwrap_err());
        assert!(msg.contains("Fare must have at most 2 decimal places"));

        // Trailing zeros do not count.
        let mut padded = draft();
        padded.fare = Some(Decimal::new(299_990, 3));
        assert_eq!(NewFlight::create(padded).unwrap().fare, Decimal::new(29999, 2));
    }

    #[test]
    fn test_patch_with_out_of_range_fare_is_rejected() {
        let mut flight = record();
        let before = flight.clone();
        let patch = FlightPatch {
            fare: Some(Decimal::new(12_345, 3)),
            ..FlightPatch::default()
        };
        assert!(flight.apply_patch(patch).is_err());
        assert_eq!(flight, before);
    }

    #[test]
    fn test_zero_fare_is_allowed() {
        let mut free = draft();
        free.fare = Some(Decimal::ZERO);
        assert!(NewFlight::create(free).is_ok());
    }

    #[test]
    fn test_empty_patch_leaves_record_unchanged() {
        let mut flight = record();
        let before = flight.clone();
        flight.apply_patch(FlightPatch::default()).unwrap();
        assert_eq!(flight, before);
    }

    #[test]
    fn test_patch_overlays_only_supplied_fields() {
        let mut flight = record();
        let patch = FlightPatch {
            fare: Some(Decimal::new(39999, 2)),
            destination_airport: Some("sfo".to_string()),
            ..FlightPatch::default()
        };
        flight.apply_patch(patch).unwrap();

        assert_eq!(flight.fare, Decimal::new(39999, 2));
        assert_eq!(flight.destination_airport, "SFO");
        assert_eq!(flight.airline, "American Airlines");
        assert_eq!(flight.departure_airport, "JFK");
    }

    #[test]
    fn test_invalid_patch_is_atomic() {
        let mut flight = record();
        let before = flight.clone();
        let patch = FlightPatch {
            airline: Some("Delta".to_string()),
            arrival_time: Some(flight.departure_time),
            ..FlightPatch::default()
        };

        assert!(flight.apply_patch(patch).is_err());
        assert_eq!(flight, before);
    }

    #[test]
    fn test_patch_with_blank_airline_is_rejected() {
        let mut flight = record();
        let patch = FlightPatch {
            airline: Some("   ".to_string()),
            ..FlightPatch::default()
        };
        assert!(flight.apply_patch(patch).is_err());
    }
}
