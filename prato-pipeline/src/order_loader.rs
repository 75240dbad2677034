//! JSON order store loader.
//!
//! Parses the persisted order export (`pedidos.json`) into domain orders
//! plus the restaurant display name. Expected document shape:
//!
//! ```json
//! {
//!   "restaurante": { "nome": "..." },
//!   "pedidos": [
//!     {
//!       "cliente": { "nome": "..." },
//!       "valor_total": 30.0,
//!       "data_pedido": "2025-06-02T19:12:44",
//!       "dia_semana": "Segunda-feira",
//!       "horario_recebimento": "...",
//!       "horario_saida": "...",
//!       "itens": [ { "nome_produto": "...", "quantidade": 2 } ]
//!     }
//!   ]
//! }
//! ```
//!
//! Only a payload that is not JSON at all is a hard failure. Both top
//! sections may be absent (empty dataset, default name), and an order
//! element that cannot be shaped into a record is dropped and counted
//! rather than aborting the load.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

use prato_metrics::{LineItem, Order};

#[derive(Debug, Error)]
pub enum LoadError {
    /// The payload is not well-formed JSON; no partial dataset is returned.
    #[error("order payload is not valid JSON: {0}")]
    InvalidInputFormat(#[from] serde_json::Error),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// The loaded dataset: display name plus every order that could be shaped.
#[derive(Debug, Default)]
pub struct OrderArchive {
    pub restaurant_name: String,
    pub orders: Vec<Order>,
    /// Order elements dropped because they could not be shaped into a
    /// record at all. Exposed for observability, not an error.
    pub skipped_records: usize,
}

// ---------------------------------------------------------------------------
// Document shape
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct ArchiveDoc {
    #[serde(default)]
    restaurante: RestaurantDoc,
    #[serde(default)]
    pedidos: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RestaurantDoc {
    #[serde(default)]
    nome: String,
}

#[derive(Debug, Default, Deserialize)]
struct OrderDoc {
    #[serde(default)]
    cliente: CustomerDoc,
    #[serde(default)]
    valor_total: Option<f64>,
    #[serde(default)]
    data_pedido: Option<String>,
    #[serde(default)]
    dia_semana: Option<String>,
    #[serde(default)]
    horario_recebimento: Option<String>,
    #[serde(default)]
    horario_saida: Option<String>,
    #[serde(default)]
    itens: Vec<ItemDoc>,
}

#[derive(Debug, Default, Deserialize)]
struct CustomerDoc {
    #[serde(default)]
    nome: String,
}

#[derive(Debug, Deserialize)]
struct ItemDoc {
    #[serde(default)]
    nome_produto: String,
    #[serde(default)]
    quantidade: u32,
}

impl OrderDoc {
    fn into_order(self) -> Order {
        Order {
            customer_name: self.cliente.nome,
            total: self.valor_total,
            placed_at: self.data_pedido,
            weekday_label: self.dia_semana,
            received_at: self.horario_recebimento,
            dispatched_at: self.horario_saida,
            items: self
                .itens
                .into_iter()
                .filter(|i| !i.nome_produto.is_empty() && i.quantidade > 0)
                .map(|i| LineItem {
                    product: i.nome_produto,
                    quantity: i.quantidade,
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse an order payload from a JSON string.
pub fn load_orders(payload: &str) -> Result<OrderArchive, LoadError> {
    let doc: ArchiveDoc = serde_json::from_str(payload)?;

    let mut orders = Vec::with_capacity(doc.pedidos.len());
    let mut skipped_records = 0;
    for element in doc.pedidos {
        // Each element is shaped individually so one mangled record
        // degrades the dataset instead of failing the whole payload.
        match serde_json::from_value::<OrderDoc>(element) {
            Ok(record) => orders.push(record.into_order()),
            Err(err) => {
                skipped_records += 1;
                log::warn!("skipping malformed order record: {err}");
            }
        }
    }

    if skipped_records > 0 {
        log::info!(
            "loaded {} orders, skipped {} malformed records",
            orders.len(),
            skipped_records
        );
    }

    Ok(OrderArchive {
        restaurant_name: doc.restaurante.nome,
        orders,
        skipped_records,
    })
}

/// Parse an order payload from a file path.
pub fn load_orders_file<P: AsRef<Path>>(path: P) -> Result<OrderArchive, LoadError> {
    let path = path.as_ref();
    let payload = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_orders(&payload)
}
