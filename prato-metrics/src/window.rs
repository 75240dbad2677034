//! Rolling-window classification for preparation-time averages.
//!
//! The three reported prep-time means partition qualifying orders by
//! calendar date relative to the evaluation instant:
//!
//! - `Today`: same calendar date as the evaluation instant
//! - `Last30Days`: date in `[today - 30d, today)`, today excluded
//! - `Older`: everything else, including future-dated orders
//!
//! The partitions are mutually exclusive; the all-time mean is their
//! union, so its underlying count is always ≥ either windowed count.

use chrono::{Duration, NaiveDate};

use crate::thresholds::ROLLING_WINDOW_DAYS;

/// Which window partition an order's calendar date falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrepWindow {
    Today,
    Last30Days,
    Older,
}

/// Classify an order date against the evaluation date.
pub fn classify(date: NaiveDate, today: NaiveDate) -> PrepWindow {
    if date == today {
        PrepWindow::Today
    } else if date < today && date >= today - Duration::days(ROLLING_WINDOW_DAYS) {
        PrepWindow::Last30Days
    } else {
        PrepWindow::Older
    }
}
