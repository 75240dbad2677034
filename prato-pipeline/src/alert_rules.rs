//! Rule-based anomaly detection over aggregated metrics.
//!
//! A fixed rule set evaluated in declaration order; the output order is
//! the evaluation order, and an empty list means "no anomalies". Callers
//! render that as a positive confirmation, not missing data.
//!
//! Rules compare against the thresholds in `prato_metrics::thresholds`,
//! the same constants the engine's windowing is built on.

use prato_metrics::thresholds::{PREP_REGRESSION_FACTOR, UNDERPERFORMING_UNITS_FLOOR};
use prato_metrics::AggregatedMetrics;

/// One fired rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    /// Stable rule identifier, for logging and filtering.
    pub rule: &'static str,
    /// Human-readable alert text, in the locale of the source system.
    pub message: String,
}

/// Evaluate every rule against a metrics snapshot.
pub fn evaluate_alerts(metrics: &AggregatedMetrics) -> Vec<Alert> {
    let mut alerts = Vec::new();

    // --- Prep-time regression ---
    // The overall mean running >25% above the trailing-30-day mean means
    // the kitchen used to be faster than it is across the whole history.
    // A zero baseline is "no data in the window", not "infinitely worse":
    // the rule stays silent rather than comparing against zero.
    let baseline = metrics.avg_prep_30d_seconds;
    if baseline > 0 && metrics.avg_prep_seconds as f64 > baseline as f64 * PREP_REGRESSION_FACTOR {
        alerts.push(Alert {
            rule: "prep_time_regression",
            message: "Tempo médio de preparo acima da média histórica (+25%).".to_string(),
        });
    }

    // --- Underperforming top products ---
    // Even a top-ranked product can be selling below the house floor.
    for product in &metrics.top_products {
        if product.sold < UNDERPERFORMING_UNITS_FLOOR {
            alerts.push(Alert {
                rule: "product_underperformance",
                message: format!(
                    "Vendas do prato {} estão abaixo do esperado.",
                    product.name
                ),
            });
        }
    }

    alerts
}

/// Convenience for callers that only need the alert texts.
pub fn alert_messages(metrics: &AggregatedMetrics) -> Vec<String> {
    evaluate_alerts(metrics)
        .into_iter()
        .map(|a| a.message)
        .collect()
}
