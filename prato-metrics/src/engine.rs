//! The aggregation engine.
//!
//! One authoritative implementation of the metrics computation: a single
//! pass over the order collection feeding a set of accumulators, then one
//! assembly step into [`AggregatedMetrics`]. Soft data-quality faults
//! (unparseable timestamps, missing prep times, negative durations,
//! missing identity fields) exclude a record from the aggregates it
//! cannot support and are counted, never raised.
//!
//! Asymmetry that must hold: a malformed order timestamp degrades
//! temporal insight (monthly buckets, weekday stats, windowed means) but
//! never the financial totals, product counts, or customer rollups.
//!
//! Money accumulates in integer centavos and is converted back to a
//! 2-fractional-digit value only at assembly, so long datasets don't
//! drift through repeated float additions.

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::metrics::{AggregatedMetrics, CustomerStats, MonthlyBucket, ProductSales};
use crate::order::{parse_timestamp, Order, Weekday};
use crate::thresholds::TOP_PRODUCTS_LIMIT;
use crate::window::{classify, PrepWindow};

/// Which optional aggregates a caller wants computed.
///
/// The grand total, prep-time windows, and product ranking are always
/// produced; the toggles cover the heavier optional groupings so callers
/// needing only a subset don't pay for the rest. Disabled aggregates are
/// present-but-empty in the output, never absent.
#[derive(Clone, Copy, Debug)]
pub struct MetricsConfig {
    pub monthly_sales: bool,
    pub weekday_prep: bool,
    pub customer_rollup: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            monthly_sales: true,
            weekday_prep: true,
            customer_rollup: true,
        }
    }
}

/// Soft data-quality counters for one engine run.
///
/// Counted regardless of which aggregates are enabled, so the signal
/// reflects the dataset rather than the configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    /// Order timestamp missing or unparseable; the order was excluded
    /// from every time-bucketed aggregate.
    pub unusable_order_timestamp: usize,
    /// Receipt or dispatch timestamp absent (in-flight or untracked).
    pub missing_prep_timestamp: usize,
    /// Receipt and dispatch both present but at least one unparseable.
    pub unparseable_prep_timestamp: usize,
    /// Dispatch earlier than receipt.
    pub negative_prep_duration: usize,
    /// Order carried no monetary total.
    pub missing_total: usize,
    /// Order carried no customer name.
    pub missing_customer: usize,
    /// Weekday label present but not one of the seven known labels.
    pub unknown_weekday_label: usize,
}

impl SkipCounts {
    /// Total number of soft skips, for logging.
    pub fn total(&self) -> usize {
        self.unusable_order_timestamp
            + self.missing_prep_timestamp
            + self.unparseable_prep_timestamp
            + self.negative_prep_duration
            + self.missing_total
            + self.missing_customer
            + self.unknown_weekday_label
    }
}

/// Compute the full metrics snapshot for a dataset.
///
/// Deterministic and side-effect-free: the result depends only on
/// `orders`, `restaurant_name`, `now`, and `config`. Concurrent callers
/// never interfere; each call returns a fresh structure.
pub fn compute_metrics(
    orders: &[Order],
    restaurant_name: &str,
    now: NaiveDateTime,
    config: &MetricsConfig,
) -> AggregatedMetrics {
    let today = now.date();
    let mut skipped = SkipCounts::default();

    let mut grand_total_cents: i64 = 0;
    let mut monthly: BTreeMap<String, MonthlyAcc> = BTreeMap::new();
    let mut weekday_prep: BTreeMap<Weekday, MeanAcc> = BTreeMap::new();
    let mut prep_all_time = MeanAcc::default();
    let mut prep_today = MeanAcc::default();
    let mut prep_30d = MeanAcc::default();
    let mut customers: BTreeMap<String, CustomerAcc> = BTreeMap::new();

    // Product units keyed by name, plus first-seen order for tie-breaking.
    let mut product_units: HashMap<String, u64> = HashMap::new();
    let mut product_order: Vec<String> = Vec::new();

    for order in orders {
        // --- Revenue ---
        // Every order with a total contributes, regardless of how broken
        // its timestamps are.
        let cents = order.total.map(to_cents);
        match cents {
            Some(c) => grand_total_cents += c,
            None => skipped.missing_total += 1,
        }

        // --- Product ranking ---
        // Also unconditional: units sold don't depend on dates.
        for item in &order.items {
            match product_units.entry(item.product.clone()) {
                Entry::Occupied(mut e) => *e.get_mut() += u64::from(item.quantity),
                Entry::Vacant(e) => {
                    product_order.push(item.product.clone());
                    e.insert(u64::from(item.quantity));
                }
            }
        }

        // --- Customer rollup ---
        let name = order.customer_name.trim();
        if name.is_empty() {
            skipped.missing_customer += 1;
        } else if config.customer_rollup {
            let acc = customers.entry(name.to_string()).or_default();
            acc.order_count += 1;
            acc.spent_cents += cents.unwrap_or(0);
        }

        // --- Temporal classification ---
        // From here on the order needs a parseable timestamp; without one
        // it is excluded from every time-bucketed aggregate.
        let placed = match order.placed_at.as_deref().and_then(parse_timestamp) {
            Some(dt) => dt,
            None => {
                skipped.unusable_order_timestamp += 1;
                continue;
            }
        };
        let date = placed.date();

        // Supplied label wins; an unrecognized or absent label falls back
        // to the weekday derived from the order timestamp.
        let weekday = match order.weekday_label.as_deref() {
            Some(label) => match Weekday::from_label(label) {
                Some(w) => w,
                None => {
                    skipped.unknown_weekday_label += 1;
                    Weekday::from(date.weekday())
                }
            },
            None => Weekday::from(date.weekday()),
        };

        // --- Monthly bucket ---
        if config.monthly_sales {
            let bucket = monthly.entry(placed.format("%Y-%m").to_string()).or_default();
            bucket.total_cents += cents.unwrap_or(0);
            *bucket.orders_by_weekday.entry(weekday).or_insert(0) += 1;
        }

        // --- Preparation time ---
        // Qualifies only when both receipt and dispatch are present and
        // parseable, and the duration is not negative.
        let received = non_blank(order.received_at.as_deref());
        let dispatched = non_blank(order.dispatched_at.as_deref());
        let (received, dispatched) = match (received, dispatched) {
            (Some(r), Some(d)) => (r, d),
            _ => {
                skipped.missing_prep_timestamp += 1;
                continue;
            }
        };
        let (received, dispatched) = match (parse_timestamp(received), parse_timestamp(dispatched))
        {
            (Some(r), Some(d)) => (r, d),
            _ => {
                skipped.unparseable_prep_timestamp += 1;
                continue;
            }
        };
        let secs = (dispatched - received).num_seconds();
        if secs < 0 {
            skipped.negative_prep_duration += 1;
            continue;
        }
        let secs = secs as u64;

        if config.weekday_prep {
            weekday_prep.entry(weekday).or_default().add(secs);
        }

        // Every qualifying order feeds the all-time mean; the two trailing
        // windows partition by calendar date and never overlap.
        prep_all_time.add(secs);
        match classify(date, today) {
            PrepWindow::Today => prep_today.add(secs),
            PrepWindow::Last30Days => prep_30d.add(secs),
            PrepWindow::Older => {}
        }
    }

    // --- Assembly ---
    let mut top_products: Vec<ProductSales> = product_order
        .into_iter()
        .map(|name| {
            let sold = product_units[&name];
            ProductSales { name, sold }
        })
        .collect();
    // Stable sort keeps first-seen order for equal unit counts.
    top_products.sort_by(|a, b| b.sold.cmp(&a.sold));
    top_products.truncate(TOP_PRODUCTS_LIMIT);

    let weekday_prep_seconds = if config.weekday_prep {
        Weekday::ALL
            .iter()
            .map(|w| (*w, weekday_prep.get(w).map_or(0, MeanAcc::mean)))
            .collect()
    } else {
        BTreeMap::new()
    };

    AggregatedMetrics {
        restaurant_name: restaurant_name.to_string(),
        grand_total_sold: from_cents(grand_total_cents),
        monthly_sales: monthly
            .into_iter()
            .map(|(month, acc)| {
                (
                    month,
                    MonthlyBucket {
                        total_sold: from_cents(acc.total_cents),
                        orders_by_weekday: acc.orders_by_weekday,
                    },
                )
            })
            .collect(),
        weekday_prep_seconds,
        avg_prep_seconds: prep_all_time.mean(),
        avg_prep_today_seconds: prep_today.mean(),
        avg_prep_30d_seconds: prep_30d.mean(),
        top_products,
        customers: customers
            .into_iter()
            .map(|(name, acc)| {
                (
                    name,
                    CustomerStats {
                        order_count: acc.order_count,
                        total_spent: from_cents(acc.spent_cents),
                    },
                )
            })
            .collect(),
        skipped,
    }
}

// ---------------------------------------------------------------------------
// Accumulators
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MeanAcc {
    total_seconds: u64,
    count: u64,
}

impl MeanAcc {
    fn add(&mut self, secs: u64) {
        self.total_seconds += secs;
        self.count += 1;
    }

    /// Floored mean in whole seconds; 0 for an empty accumulator.
    fn mean(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.total_seconds / self.count
        }
    }
}

#[derive(Default)]
struct MonthlyAcc {
    total_cents: i64,
    orders_by_weekday: BTreeMap<Weekday, u32>,
}

#[derive(Default)]
struct CustomerAcc {
    order_count: u32,
    spent_cents: i64,
}

/// Round a currency value to integer centavos on ingest.
fn to_cents(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::LineItem;

    fn at(raw: &str) -> NaiveDateTime {
        parse_timestamp(raw).unwrap()
    }

    fn order(total: f64, placed: &str, received: &str, dispatched: &str) -> Order {
        Order {
            customer_name: "Ana Souza".into(),
            total: Some(total),
            placed_at: Some(placed.into()),
            weekday_label: None,
            received_at: Some(received.into()),
            dispatched_at: Some(dispatched.into()),
            items: vec![LineItem {
                product: "Pizza Calabresa".into(),
                quantity: 1,
            }],
        }
    }

    #[test]
    fn centavo_accumulation_avoids_float_drift() {
        // 0.10 added 1000 times drifts under naive f64 summation.
        let orders: Vec<Order> = (0..1000)
            .map(|_| Order {
                customer_name: "Ana".into(),
                total: Some(0.10),
                ..Order::default()
            })
            .collect();
        let m = compute_metrics(&orders, "Pizzaria", at("2025-06-30T12:00:00"), &MetricsConfig::default());
        assert_eq!(m.grand_total_sold, 100.00);
    }

    #[test]
    fn missing_total_is_counted_not_fatal() {
        let mut o = order(30.0, "2025-06-30T10:00:00", "2025-06-30T10:00:00", "2025-06-30T10:10:00");
        o.total = None;
        let m = compute_metrics(&[o], "Pizzaria", at("2025-06-30T12:00:00"), &MetricsConfig::default());
        assert_eq!(m.grand_total_sold, 0.0);
        assert_eq!(m.skipped.missing_total, 1);
        // Items still count even without a total.
        assert_eq!(m.top_products[0].sold, 1);
    }

    #[test]
    fn negative_prep_duration_is_a_skip() {
        let o = order(10.0, "2025-06-30T10:00:00", "2025-06-30T10:10:00", "2025-06-30T10:00:00");
        let m = compute_metrics(&[o], "Pizzaria", at("2025-06-30T12:00:00"), &MetricsConfig::default());
        assert_eq!(m.skipped.negative_prep_duration, 1);
        assert_eq!(m.avg_prep_seconds, 0);
    }

    #[test]
    fn unknown_weekday_label_falls_back_to_timestamp() {
        let mut o = order(10.0, "2025-06-30T10:00:00", "2025-06-30T10:00:00", "2025-06-30T10:05:00");
        o.weekday_label = Some("Segundafeira".into()); // typo in source data
        let m = compute_metrics(&[o], "Pizzaria", at("2025-06-30T12:00:00"), &MetricsConfig::default());
        assert_eq!(m.skipped.unknown_weekday_label, 1);
        // 2025-06-30 is a Monday; the derived label still lands the bucket.
        assert_eq!(m.weekday_prep_seconds[&Weekday::Segunda], 300);
    }

    #[test]
    fn supplied_label_wins_over_derived_weekday() {
        let mut o = order(10.0, "2025-06-30T10:00:00", "2025-06-30T10:00:00", "2025-06-30T10:05:00");
        // Source says Tuesday even though the date is a Monday; the label
        // is redundant-but-authoritative in the original data.
        o.weekday_label = Some("Terça-feira".into());
        let m = compute_metrics(&[o], "Pizzaria", at("2025-06-30T12:00:00"), &MetricsConfig::default());
        assert_eq!(m.weekday_prep_seconds[&Weekday::Terca], 300);
        assert_eq!(m.weekday_prep_seconds[&Weekday::Segunda], 0);
    }

    #[test]
    fn disabled_aggregates_come_back_empty() {
        let o = order(10.0, "2025-06-30T10:00:00", "2025-06-30T10:00:00", "2025-06-30T10:05:00");
        let config = MetricsConfig {
            monthly_sales: false,
            weekday_prep: false,
            customer_rollup: false,
        };
        let m = compute_metrics(&[o], "Pizzaria", at("2025-06-30T12:00:00"), &config);
        assert!(m.monthly_sales.is_empty());
        assert!(m.weekday_prep_seconds.is_empty());
        assert!(m.customers.is_empty());
        // Always-on aggregates are unaffected.
        assert_eq!(m.grand_total_sold, 10.0);
        assert_eq!(m.avg_prep_seconds, 300);
    }

    #[test]
    fn monthly_bucket_groups_by_year_month() {
        let orders = vec![
            order(10.0, "2025-05-15T10:00:00", "2025-05-15T10:00:00", "2025-05-15T10:05:00"),
            order(20.0, "2025-05-20T10:00:00", "2025-05-20T10:00:00", "2025-05-20T10:05:00"),
            order(40.0, "2025-06-01T10:00:00", "2025-06-01T10:00:00", "2025-06-01T10:05:00"),
        ];
        let m = compute_metrics(&orders, "Pizzaria", at("2025-06-30T12:00:00"), &MetricsConfig::default());
        assert_eq!(m.monthly_sales.len(), 2);
        assert_eq!(m.monthly_sales["2025-05"].total_sold, 30.0);
        assert_eq!(m.monthly_sales["2025-06"].total_sold, 40.0);
        // Keys iterate chronologically.
        let months: Vec<&String> = m.monthly_sales.keys().collect();
        assert_eq!(months, vec!["2025-05", "2025-06"]);
    }

    #[test]
    fn weekday_map_always_has_seven_labels() {
        let m = compute_metrics(&[], "Pizzaria", at("2025-06-30T12:00:00"), &MetricsConfig::default());
        assert_eq!(m.weekday_prep_seconds.len(), 7);
        assert!(m.weekday_prep_seconds.values().all(|&mean| mean == 0));
    }

    #[test]
    fn mean_is_floored_to_whole_seconds() {
        let orders = vec![
            order(10.0, "2025-06-30T10:00:00", "2025-06-30T10:00:00", "2025-06-30T10:00:05"),
            order(10.0, "2025-06-30T11:00:00", "2025-06-30T11:00:00", "2025-06-30T11:00:10"),
            order(10.0, "2025-06-30T12:00:00", "2025-06-30T12:00:00", "2025-06-30T12:00:10"),
        ];
        // (5 + 10 + 10) / 3 = 8.33… → 8
        let m = compute_metrics(&orders, "Pizzaria", at("2025-06-30T12:00:00"), &MetricsConfig::default());
        assert_eq!(m.avg_prep_seconds, 8);
    }
}
