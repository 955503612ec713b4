//! Spanish display labels for dates.

use chrono::{Locale, NaiveDate};

const LOCALE: Locale = Locale::es_ES;

/// Label for trip boundaries, e.g. `01 marzo 2024`.
pub fn trip_label(date: NaiveDate) -> String {
    date.format_localized("%d %B %Y", LOCALE).to_string()
}

/// Label for a schedule day, e.g. `viernes 01 marzo`.
pub fn day_label(date: NaiveDate) -> String {
    date.format_localized("%A %d %B", LOCALE).to_string()
}
