use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::iata::is_valid_airport_code;

/// A flight option returned by the external supplier for a single search.
/// Never persisted. Fields mirror the supplier payload, so any of them may be
/// missing; [`ExternalFlightOffer::is_valid`] decides whether it is usable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalFlightOffer {
    pub carrier: Option<String>,
    pub base_price: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub departure_airport: Option<String>,
    pub arrival_airport: Option<String>,
    /// Local time in the supplier's zone.
    pub outbound_date_time: Option<NaiveDateTime>,
    /// Local time in the supplier's zone.
    pub inbound_date_time: Option<NaiveDateTime>,
}

impl ExternalFlightOffer {
    /// `base_price + tax`, or zero when either operand is missing.
    pub fn total_fare(&self) -> Decimal {
        match (self.base_price, self.tax) {
            (Some(base), Some(tax)) => base + tax,
            _ => Decimal::ZERO,
        }
    }

    pub fn is_valid(&self) -> bool {
        let carrier_ok = self.carrier.as_deref().is_some_and(|c| !c.trim().is_empty());
        let prices_ok = match (self.base_price, self.tax) {
            (Some(base), Some(tax)) => {
                base >= Decimal::ZERO && tax >= Decimal::ZERO && base.checked_add(tax).is_some()
            }
            _ => false,
        };
        let airports_ok = self.departure_airport.as_deref().is_some_and(is_valid_airport_code)
            && self.arrival_airport.as_deref().is_some_and(is_valid_airport_code);
        let times_ok = match (self.outbound_date_time, self.inbound_date_time) {
            (Some(outbound), Some(inbound)) => inbound > outbound,
            _ => false,
        };

        carrier_ok && prices_ok && airports_ok && times_ok
    }
}
