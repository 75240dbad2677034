//! Centralized analysis thresholds.
//!
//! Shared by the aggregation engine in this crate and the alert rules in
//! `prato-pipeline`. Changing a value here affects both the windowed
//! aggregates and the rule evaluation built on top of them.

/// Length of the trailing prep-time window, in calendar days.
pub const ROLLING_WINDOW_DAYS: i64 = 30;

/// How many products the sales ranking keeps.
pub const TOP_PRODUCTS_LIMIT: usize = 3;

/// The overall prep-time mean must exceed the 30-day baseline by this
/// factor before the regression rule fires (+25%).
pub const PREP_REGRESSION_FACTOR: f64 = 1.25;

/// Unit-sales floor below which a top-ranked product is flagged as
/// underperforming.
pub const UNDERPERFORMING_UNITS_FLOOR: u64 = 50;
