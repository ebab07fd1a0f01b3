//! Error types for the preview pipeline
//!
//! Covers:
//! - Source parsing failures (caught before any round trip is attempted)
//! - Transport failures talking to the evaluation service
//! - Structured API errors and definition rejections from the server
//! - Unauthorized responses (re-authentication is owned by the shell)
//!
//! Every variant is terminal for one evaluation cycle only. The session
//! stays usable and the next debounced trigger naturally retries.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Source text could not be turned into a document draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Source is not well-formed structured text
    #[error("{message}")]
    Syntax {
        /// Underlying deserializer message
        message: String,
    },

    /// A field the document kind requires is absent from the parsed draft
    #[error("{field} is required")]
    MissingField {
        /// Name of the missing field
        field: &'static str,
    },
}

/// One entry of a structured rejection returned by the evaluation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionIssue {
    /// Stable issue identifier assigned by the server
    pub id: String,
    /// Human-readable description
    pub message: String,
}

/// Errors surfaced at the session boundary.
///
/// Variants are `Clone` because the active error lives inside the
/// observable session state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreviewError {
    /// Draft rejected locally, before any request was dispatched
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The evaluation call itself failed (connect, timeout, malformed body)
    #[error("transport error: {0}")]
    Transport(String),

    /// The server rejected the request with a structured error body
    #[error("{kind}: {message}")]
    Api {
        /// Server-assigned error type
        kind: String,
        /// Human-readable message
        message: String,
        /// Optional structured detail
        payload: Option<JsonValue>,
    },

    /// The server rejected the definition with a validation-error list
    #[error("definition rejected: {} issue(s)", .0.len())]
    Rejected(Vec<DefinitionIssue>),

    /// The session is no longer authenticated
    #[error("unauthorized")]
    Unauthorized,
}

impl PreviewError {
    /// True when the failure happened locally, before any round trip.
    #[inline]
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// True when the shell should send the user back through login.
    #[inline]
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Issues attached to a structured rejection, if any.
    #[inline]
    #[must_use]
    pub fn issues(&self) -> &[DefinitionIssue] {
        match self {
            Self::Rejected(issues) => issues,
            _ => &[],
        }
    }
}
