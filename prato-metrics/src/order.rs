//! Order domain model.
//!
//! Orders arrive from a loosely-structured export of the ordering system:
//! monetary totals may be missing, timestamps are ISO-8601-ish strings of
//! varying discipline, and the weekday label is supplied redundantly next
//! to the order timestamp. The types here keep those fields as they came
//! in; the engine decides what each order is usable for.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One product line within an order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product display name, the accumulation key for sales rankings.
    pub product: String,
    pub quantity: u32,
}

/// One customer transaction, as loaded from the order store.
///
/// Timestamp fields stay raw strings: whether a value parses decides which
/// aggregates the order qualifies for, and that decision belongs to the
/// engine, not the loader.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Customer display name. There is no stable customer ID in the source
    /// data; all orders sharing a name are treated as one customer.
    pub customer_name: String,
    /// Order total in the restaurant's currency. `None` when the record
    /// carried no total.
    pub total: Option<f64>,
    /// When the order was placed.
    pub placed_at: Option<String>,
    /// Weekday label as supplied by the source system ("Segunda-feira" ...).
    pub weekday_label: Option<String>,
    /// When the kitchen received the order. Absent for in-flight orders.
    pub received_at: Option<String>,
    /// When the order was dispatched/ready. Absent for in-flight orders.
    pub dispatched_at: Option<String>,
    pub items: Vec<LineItem>,
}

// ---------------------------------------------------------------------------
// Weekday labels
// ---------------------------------------------------------------------------

/// The seven weekday labels used by the source locale.
///
/// Declaration order is Monday first, so ordered maps keyed by `Weekday`
/// iterate and serialize in week order rather than alphabetically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "Segunda-feira")]
    Segunda,
    #[serde(rename = "Terça-feira")]
    Terca,
    #[serde(rename = "Quarta-feira")]
    Quarta,
    #[serde(rename = "Quinta-feira")]
    Quinta,
    #[serde(rename = "Sexta-feira")]
    Sexta,
    #[serde(rename = "Sábado")]
    Sabado,
    #[serde(rename = "Domingo")]
    Domingo,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Segunda,
        Weekday::Terca,
        Weekday::Quarta,
        Weekday::Quinta,
        Weekday::Sexta,
        Weekday::Sabado,
        Weekday::Domingo,
    ];

    /// The label as written by the source system.
    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Segunda => "Segunda-feira",
            Weekday::Terca => "Terça-feira",
            Weekday::Quarta => "Quarta-feira",
            Weekday::Quinta => "Quinta-feira",
            Weekday::Sexta => "Sexta-feira",
            Weekday::Sabado => "Sábado",
            Weekday::Domingo => "Domingo",
        }
    }

    /// Match a supplied label against the seven known ones.
    ///
    /// Matching is case-insensitive but accent-exact; anything else is an
    /// unknown label and the caller falls back to the order timestamp.
    pub fn from_label(label: &str) -> Option<Weekday> {
        let wanted = label.trim().to_lowercase();
        Weekday::ALL
            .iter()
            .find(|w| w.label().to_lowercase() == wanted)
            .copied()
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Segunda,
            chrono::Weekday::Tue => Weekday::Terca,
            chrono::Weekday::Wed => Weekday::Quarta,
            chrono::Weekday::Thu => Weekday::Quinta,
            chrono::Weekday::Fri => Weekday::Sexta,
            chrono::Weekday::Sat => Weekday::Sabado,
            chrono::Weekday::Sun => Weekday::Domingo,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

/// Accepted timestamp layouts, tried in order after RFC 3339.
const FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601-ish timestamp string from the order store.
///
/// Accepts a full RFC 3339 value with offset, or a bare local datetime
/// with either `T` or space as the separator and optional fractional
/// seconds. Returns `None` for anything else; unparseable values are a
/// soft data-quality condition, never an error.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}
