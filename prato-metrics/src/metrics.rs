//! The aggregated metrics snapshot.
//!
//! Serialized field names follow the contract the downstream consumers
//! (alert rules, narrative generator, presentation) already speak, so the
//! JSON form of this struct is the hand-off format. Every field is always
//! present; empty buckets and windows are zero/empty, never missing.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::engine::SkipCounts;
use crate::order::Weekday;

/// Immutable snapshot of the derived business metrics for one dataset.
///
/// Recomputed fresh on every invocation; consumers read it, they never
/// update it.
#[derive(Clone, Debug, Serialize)]
pub struct AggregatedMetrics {
    pub restaurant_name: String,
    /// Revenue over the whole dataset, rounded to 2 fractional digits.
    pub grand_total_sold: f64,
    /// "YYYY-MM" → monthly revenue plus per-weekday order counts.
    /// The key format sorts lexically in chronological order.
    pub monthly_sales: BTreeMap<String, MonthlyBucket>,
    /// Mean preparation time per weekday, whole seconds. Contains all
    /// seven labels; a weekday with no qualifying orders reports 0.
    pub weekday_prep_seconds: BTreeMap<Weekday, u64>,
    /// Mean prep time over every qualifying order, whole seconds.
    pub avg_prep_seconds: u64,
    /// Mean prep time for orders placed on the evaluation date.
    pub avg_prep_today_seconds: u64,
    /// Mean prep time for the trailing 30 days, today excluded.
    pub avg_prep_30d_seconds: u64,
    /// Best-selling products, descending by units, at most three.
    pub top_products: Vec<ProductSales>,
    /// Customer display name → order count and total spend.
    pub customers: BTreeMap<String, CustomerStats>,
    /// Soft data-quality counters accumulated during the run.
    pub skipped: SkipCounts,
}

/// One month's slice of the sales history.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MonthlyBucket {
    /// Revenue for the month, rounded to 2 fractional digits.
    pub total_sold: f64,
    /// How many orders landed on each weekday of this month.
    pub orders_by_weekday: BTreeMap<Weekday, u32>,
}

/// One entry of the top-products ranking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub name: String,
    /// Total units sold across the dataset.
    pub sold: u64,
}

/// Per-customer rollup. Customers are keyed by display name only, so two
/// people sharing a name merge into one entry. A documented limitation
/// of the source data, not corrected here.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CustomerStats {
    #[serde(rename = "numero_de_pedidos")]
    pub order_count: u32,
    /// Total spend, rounded to 2 fractional digits.
    #[serde(rename = "valor_total_gasto")]
    pub total_spent: f64,
}
