use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::flight::FlightRecord;
use crate::offer::ExternalFlightOffer;
use crate::supplier::EXTERNAL_SUPPLIER_NAME;
use crate::supplier_time::supplier_local_to_utc;

/// The single response shape for stored and supplier flights alike.
/// `id` is `None` for supplier flights, which are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedFlightView {
    pub id: Option<i64>,
    pub airline: String,
    pub supplier: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub fare: Decimal,
    pub departure_airport: String,
    pub destination_airport: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
}

impl UnifiedFlightView {
    pub fn from_stored(flight: &FlightRecord) -> Self {
        Self {
            id: Some(flight.id),
            airline: flight.airline.clone(),
            supplier: flight.supplier.clone(),
            fare: flight.fare,
            departure_airport: flight.departure_airport.clone(),
            destination_airport: flight.destination_airport.clone(),
            departure_time: flight.departure_time,
            arrival_time: flight.arrival_time,
        }
    }

    /// Projects a supplier offer. The supplier label is always the fixed
    /// provider name, the airline is the carrier, and local supplier times are
    /// converted to UTC. Returns `None` when the offer lacks a field the view
    /// cannot do without.
    pub fn from_external(offer: &ExternalFlightOffer) -> Option<Self> {
        Some(Self {
            id: None,
            airline: offer.carrier.clone()?,
            supplier: EXTERNAL_SUPPLIER_NAME.to_string(),
            fare: offer.total_fare(),
            departure_airport: offer.departure_airport.clone()?,
            destination_airport: offer.arrival_airport.clone()?,
            departure_time: supplier_local_to_utc(offer.outbound_date_time?)?,
            arrival_time: supplier_local_to_utc(offer.inbound_date_time?)?,
        })
    }
}

impl From<&FlightRecord> for UnifiedFlightView {
    fn from(flight: &FlightRecord) -> Self {
        Self::from_stored(flight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn lufthansa() -> ExternalFlightOffer {
        ExternalFlightOffer {
            carrier: Some("Lufthansa".to_string()),
            base_price: Some(Decimal::from(250)),
            tax: Some(Decimal::from(50)),
            departure_airport: Some("JFK".to_string()),
            arrival_airport: Some("LAX".to_string()),
            outbound_date_time: Some("2025-10-25T14:00:00".parse().unwrap()),
            inbound_date_time: Some("2025-10-25T20:15:00".parse().unwrap()),
        }
    }

    #[test]
    fn test_stored_flight_keeps_identity() {
        let now = Utc::now();
        let flight = FlightRecord {
            id: 7,
            airline: "American Airlines".to_string(),
            supplier: "GlobalSupplier".to_string(),
            fare: Decimal::new(29999, 2),
            departure_airport: "JFK".to_string(),
            destination_airport: "LAX".to_string(),
            departure_time: Utc.with_ymd_and_hms(2025, 10, 25, 10, 30, 0).unwrap(),
            arrival_time: Utc.with_ymd_and_hms(2025, 10, 25, 16, 45, 0).unwrap(),
            created_at: now,
            updated_at: now,
        };

        let view = UnifiedFlightView::from(&flight);
        assert_eq!(view.id, Some(7));
        assert_eq!(view.supplier, "GlobalSupplier");
        assert_eq!(view.fare, Decimal::new(29999, 2));
        assert_eq!(view.departure_time, flight.departure_time);
    }

    #[test]
    fn test_external_offer_projection() {
        let view = UnifiedFlightView::from_external(&lufthansa()).unwrap();

        assert_eq!(view.id, None);
        assert_eq!(view.supplier, EXTERNAL_SUPPLIER_NAME);
        assert_eq!(view.airline, "Lufthansa");
        assert_eq!(view.fare, Decimal::new(30000, 2));
        assert_eq!(view.departure_airport, "JFK");
        assert_eq!(view.destination_airport, "LAX");
        // 25 October 2025 is still summer time in CET (UTC+2).
        assert_eq!(view.departure_time, Utc.with_ymd_and_hms(2025, 10, 25, 12, 0, 0).unwrap());
        assert_eq!(view.arrival_time, Utc.with_ymd_and_hms(2025, 10, 25, 18, 15, 0).unwrap());
    }

    #[test]
    fn test_external_offer_missing_carrier_has_no_view() {
        let mut offer = lufthansa();
        offer.carrier = None;
        assert!(UnifiedFlightView::from_external(&offer).is_none());
    }

    #[test]
    fn test_view_serializes_camel_case_with_utc_offset() {
        let view = UnifiedFlightView::from_external(&lufthansa()).unwrap();
        let json = serde_json::to_value(&view).unwrap();

        assert!(json["id"].is_null());
        assert_eq!(json["fare"], serde_json::json!(300.0));
        assert_eq!(json["departureAirport"], "JFK");
        assert_eq!(json["departureTime"], "2025-10-25T12:00:00Z");
    }
}
