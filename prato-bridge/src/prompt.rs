//! Prompt templates and substitution.
//!
//! Templates use `{{placeholder}}` markers. Substitution is a pure
//! function, and a marker still present after substitution is a hard
//! error: a prompt silently carrying literal `{{alerts}}` text into the
//! service is worse than no prompt at all.

use std::collections::BTreeMap;

use crate::error::{BridgeError, BridgeResult};
use crate::protocol::ReportRequest;

/// The consolidated-report prompt, answered as a JSON document.
pub const REPORT_PROMPT: &str = "\
Você é um analista de restaurantes. Gere um relatório curto e acionável para o restaurante {{restaurant_name}}.

Dados atuais:
- Top produtos: {{top_products}}
- Tempo médio de preparo geral: {{avg_prep}} seg
- Tempo médio de preparo hoje: {{avg_prep_today}} seg
- Média histórica (30d): {{avg_prep_30d}} seg
- Alertas: {{alerts}}

Responda em JSON no formato:
{
  \"title\": \"...\",
  \"summary\": \"...\",
  \"top_products\": [...],
  \"avg_prep\": ...,
  \"avg_prep_30d\": ...,
  \"alerts\": [...],
  \"recommendations\": [...]
}
";

/// Substitute `{{key}}` markers in a template.
///
/// Values that are not referenced by the template are ignored; a marker
/// with no value fails loudly with the placeholder name.
pub fn render_prompt(template: &str, values: &BTreeMap<&str, String>) -> BridgeResult<String> {
    let mut rendered = template.to_string();
    for (key, value) in values {
        rendered = rendered.replace(&format!("{{{{{key}}}}}"), value);
    }
    if let Some(missing) = find_placeholder(&rendered) {
        return Err(BridgeError::UnresolvedPlaceholder(missing.to_string()));
    }
    Ok(rendered)
}

/// Render the report prompt for one request.
pub fn report_prompt(request: &ReportRequest) -> BridgeResult<String> {
    let mut values = BTreeMap::new();
    values.insert("restaurant_name", request.restaurant_name.clone());
    values.insert(
        "top_products",
        serde_json::to_string(&request.top_products)?,
    );
    values.insert("avg_prep", request.avg_prep_seconds.to_string());
    values.insert(
        "avg_prep_today",
        request.avg_prep_today_seconds.to_string(),
    );
    values.insert("avg_prep_30d", request.avg_prep_30d_seconds.to_string());
    values.insert("alerts", serde_json::to_string(&request.alerts)?);
    render_prompt(REPORT_PROMPT, &values)
}

/// First `{{...}}` marker left in a rendered prompt, if any.
fn find_placeholder(rendered: &str) -> Option<&str> {
    let start = rendered.find("{{")?;
    let rest = &rendered[start + 2..];
    let end = rest.find("}}")?;
    Some(&rest[..end])
}
