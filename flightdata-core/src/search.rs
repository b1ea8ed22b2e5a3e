use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::iata::normalize_optional_code;

/// Inclusive, independently optional time bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub departure_from: Option<DateTime<Utc>>,
    pub departure_to: Option<DateTime<Utc>>,
    pub arrival_from: Option<DateTime<Utc>>,
    pub arrival_to: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// True when `departure`/`arrival` satisfy every bound that is present.
    pub fn contains(&self, departure: DateTime<Utc>, arrival: DateTime<Utc>) -> bool {
        self.departure_from.map_or(true, |from| departure >= from)
            && self.departure_to.map_or(true, |to| departure <= to)
            && self.arrival_from.map_or(true, |from| arrival >= from)
            && self.arrival_to.map_or(true, |to| arrival <= to)
    }
}

/// Zero-based page index and page size. The size is clamped by the HTTP
/// boundary before it gets here; nothing below re-clamps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub const DEFAULT_SIZE: u32 = 20;

    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        total_pages(self.total_elements, self.size)
    }
}

/// `ceil(total / size)`, zero when the size is zero.
pub fn total_pages(total_elements: u64, size: u32) -> u64 {
    let size = u64::from(size);
    if size == 0 {
        return 0;
    }
    total_elements.div_ceil(size)
}

/// Criteria for the stored-flight search. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub airline: Option<String>,
    pub time_range: TimeRange,
    pub page: PageRequest,
}

impl SearchFilter {
    /// Uppercases airport codes and drops blank text criteria.
    pub fn normalized(self) -> Self {
        Self {
            origin: normalize_optional_code(self.origin.as_deref()),
            destination: normalize_optional_code(self.destination.as_deref()),
            airline: self
                .airline
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            time_range: self.time_range,
            page: self.page,
        }
    }

    /// Case-insensitive substring match against the airline criterion.
    pub fn matches_airline(&self, airline: &str) -> bool {
        airline_matches(self.airline.as_deref(), airline)
    }
}

pub fn airline_matches(needle: Option<&str>, airline: &str) -> bool {
    match needle {
        Some(needle) => airline.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}
