//! Extraction and validation of service responses.
//!
//! The service is asked for JSON but answers like a language model:
//! sometimes bare JSON, sometimes fenced, sometimes wrapped in prose.
//! Extraction takes the outermost object (first `{` to last `}`), then
//! the parse is strict and the document is validated before anything
//! downstream sees it.

use crate::error::{BridgeError, BridgeResult};
use crate::protocol::ReportDocument;

/// Slice the outermost JSON object out of a free-text response.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parse and validate a report document from raw response text.
pub fn parse_report(text: &str) -> BridgeResult<ReportDocument> {
    let json = extract_json(text).ok_or(BridgeError::MissingJson)?;
    let document: ReportDocument = serde_json::from_str(json)?;
    validate(&document)?;
    Ok(document)
}

/// A usable document needs at least a title and a summary; everything
/// else may legitimately be empty.
fn validate(document: &ReportDocument) -> BridgeResult<()> {
    if document.title.trim().is_empty() {
        return Err(BridgeError::InvalidResponse("empty title".into()));
    }
    if document.summary.trim().is_empty() {
        return Err(BridgeError::InvalidResponse("empty summary".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let doc = parse_report(
            r#"{ "title": "Relatório Semanal", "summary": "Vendas estáveis.", "recommendations": ["Promover esfihas"] }"#,
        )
        .unwrap();
        assert_eq!(doc.title, "Relatório Semanal");
        assert_eq!(doc.recommendations.len(), 1);
    }

    #[test]
    fn parses_fenced_response() {
        let text = "Claro! Aqui está o relatório:\n```json\n{ \"title\": \"Relatório\", \"summary\": \"Tudo certo.\" }\n```\nEspero que ajude.";
        let doc = parse_report(text).unwrap();
        assert_eq!(doc.title, "Relatório");
    }

    #[test]
    fn missing_object_is_an_error() {
        let err = parse_report("Não consegui gerar o relatório.").unwrap_err();
        assert!(matches!(err, BridgeError::MissingJson));
    }

    #[test]
    fn empty_title_fails_validation() {
        let err = parse_report(r#"{ "title": "", "summary": "ok" }"#).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidResponse(_)));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = parse_report(r#"{ "title": "Relatório", "#).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MissingJson | BridgeError::Serialization(_)
        ));
    }
}
