//! Wire format of the supplier's `/flights` endpoint.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use flightdata_core::{ExternalFlightOffer, SupplierQuery};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSearchRequest {
    pub from: String,
    pub to: String,
    pub outbound_date: NaiveDate,
    pub inbound_date: NaiveDate,
}

impl From<&SupplierQuery> for SupplierSearchRequest {
    fn from(query: &SupplierQuery) -> Self {
        Self {
            from: query.origin.clone(),
            to: query.destination.clone(),
            outbound_date: query.outbound_date,
            inbound_date: query.inbound_date,
        }
    }
}

/// One offer as the supplier sends it. Every field is optional on the wire.
///
/// A price that does not fit a [`Decimal`] decodes as `None`, so only that
/// offer is rejected later instead of the whole payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplierFlightDto {
    pub carrier: Option<String>,
    #[serde(deserialize_with = "lenient_price")]
    pub base_price: Option<Decimal>,
    #[serde(deserialize_with = "lenient_price")]
    pub tax: Option<Decimal>,
    pub departure_airport_name: Option<String>,
    pub arrival_airport_name: Option<String>,
    pub outbound_date_time: Option<NaiveDateTime>,
    pub inbound_date_time: Option<NaiveDateTime>,
}

impl From<SupplierFlightDto> for ExternalFlightOffer {
    fn from(dto: SupplierFlightDto) -> Self {
        Self {
            carrier: dto.carrier,
            base_price: dto.base_price,
            tax: dto.tax,
            departure_airport: dto.departure_airport_name,
            arrival_airport: dto.arrival_airport_name,
            outbound_date_time: dto.outbound_date_time,
            inbound_date_time: dto.inbound_date_time,
        }
    }
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(price_from_json))
}

fn price_from_json(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Decodes a response body. An empty body or a JSON `null` means no offers.
pub fn parse_offers(body: &[u8]) -> Result<Vec<SupplierFlightDto>, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let decoded: Option<Vec<SupplierFlightDto>> = serde_json::from_slice(body)?;
    Ok(decoded.unwrap_or_default())
}
