//! Report generation across the boundary.

use crate::connector::ChatService;
use crate::error::BridgeResult;
use crate::prompt::report_prompt;
use crate::protocol::{ReportDocument, ReportRequest};
use crate::response_validator::parse_report;

/// Ask the service to narrate a metrics snapshot into a report document.
///
/// Rendering, completion, extraction, and validation each fail with their
/// own error; the caller decides whether a failed narrative degrades to
/// showing the raw metrics (the usual choice) or aborts.
pub async fn generate_report(
    chat: &dyn ChatService,
    request: &ReportRequest,
) -> BridgeResult<ReportDocument> {
    let prompt = report_prompt(request)?;
    let completion = chat.complete(&prompt).await?;
    parse_report(&completion)
}
