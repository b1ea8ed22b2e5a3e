//! Conversions between UTC and the external supplier's civil time.
//!
//! The supplier publishes local date-times without an offset in Central
//! European Time, which observes daylight saving. Offsets therefore come from
//! the IANA rules bundled with `chrono-tz`, never from a fixed hour count.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// Fixed zone in which the supplier expresses dates and local times.
pub const SUPPLIER_TIMEZONE: Tz = chrono_tz::CET;

/// Resolves a supplier local date-time to UTC.
///
/// Ambiguous times (autumn fall-back) resolve to the earlier offset. Times in
/// the spring-forward gap are read with the offset in force before the gap,
/// which moves them forward by the length of the gap.
pub fn supplier_local_to_utc(local: NaiveDateTime) -> Option<DateTime<Utc>> {
    match SUPPLIER_TIMEZONE.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            // Transitions are always more than a day apart.
            let before_gap = SUPPLIER_TIMEZONE
                .offset_from_utc_datetime(&(local - Duration::days(1)))
                .fix();
            before_gap
                .from_local_datetime(&local)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
        }
    }
}

/// Calendar date of `instant` as seen in the supplier's zone.
pub fn supplier_date_of(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&SUPPLIER_TIMEZONE).date_naive()
}

pub fn supplier_today() -> NaiveDate {
    supplier_date_of(Utc::now())
}
