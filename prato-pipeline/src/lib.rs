//! Order ingestion and rule evaluation around the metrics core.
//!
//! Data flows one way: the loader turns a persisted order payload into
//! domain orders, `prato-metrics` aggregates them, and the alert rules
//! read the aggregated snapshot. Nothing here calls back out.

pub mod alert_rules;
pub mod order_loader;

pub use alert_rules::{alert_messages, evaluate_alerts, Alert};
pub use order_loader::{load_orders, load_orders_file, LoadError, OrderArchive};
