//! Request and response shapes crossing the narrative boundary.
//!
//! The aggregation side supplies exactly the fields in [`ReportRequest`];
//! the service answers with the structured document in
//! [`ReportDocument`]. Both shapes are the whole contract; nothing on
//! either side needs to know more.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One product entry as handed across the boundary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductEntry {
    pub name: String,
    pub sold: u64,
}

/// Everything the narrative generator is given to work with.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportRequest {
    pub restaurant_name: String,
    pub top_products: Vec<ProductEntry>,
    pub avg_prep_seconds: u64,
    pub avg_prep_today_seconds: u64,
    pub avg_prep_30d_seconds: u64,
    pub alerts: Vec<String>,
}

/// The structured report the service answers with.
///
/// Fields default individually: the service occasionally omits the echo
/// fields, and only `title` and `summary` are required for the document
/// to be usable (see [`crate::response_validator::parse_report`]).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReportDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    /// Echo of the ranked products, in whatever shape the model chose.
    #[serde(default)]
    pub top_products: Vec<Value>,
    #[serde(default)]
    pub avg_prep: Option<f64>,
    #[serde(default)]
    pub avg_prep_30d: Option<f64>,
    #[serde(default)]
    pub alerts: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}
