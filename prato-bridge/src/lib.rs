//! The narrative-generator boundary.
//!
//! The metrics core never calls outward; this crate is the one place the
//! system talks to an external text-generation service. It owns the
//! request/response shapes crossing that boundary, the prompt templates
//! and their substitution, the extraction/validation of the service's
//! JSON answers, and a timeout-bounded, bounded-retry chat connector
//! behind the [`ChatService`] trait so callers inject the client instead
//! of reaching for a process-wide instance.

pub mod connector;
pub mod error;
pub mod narrative;
pub mod prompt;
pub mod protocol;
pub mod response_validator;

pub use connector::{ChatService, GeminiChatService, GeminiConfig};
pub use error::{BridgeError, BridgeResult};
pub use narrative::generate_report;
pub use protocol::{ReportDocument, ReportRequest};
