//! Evaluation request assembly
//!
//! A pure merge of a parsed draft and the reconciled parameter values into
//! the wire shape the evaluation service accepts. Validation has already
//! happened upstream; nothing is checked here.

use crate::document::{Document, DocumentKind};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Wire request for one evaluation round trip.
///
/// Views always carry a parameters map, possibly empty. Dashboards are
/// previewed without parameter substitution and never carry one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PreviewRequest {
    /// `{ "view": ..., "parameters": { ... } }`
    View {
        /// The draft body
        view: JsonValue,
        /// Reconciled parameter values
        parameters: IndexMap<String, String>,
    },
    /// `{ "dashboard": ... }`
    Dashboard {
        /// The draft body
        dashboard: JsonValue,
    },
}

impl PreviewRequest {
    /// Merge a draft with the reconciled parameter values.
    #[must_use]
    pub fn build(document: &Document, parameters: IndexMap<String, String>) -> Self {
        match document.kind() {
            DocumentKind::View => Self::View {
                view: document.body().clone(),
                parameters,
            },
            DocumentKind::Dashboard => Self::Dashboard {
                dashboard: document.body().clone(),
            },
        }
    }

    /// Kind of document this request previews.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::View { .. } => DocumentKind::View,
            Self::Dashboard { .. } => DocumentKind::Dashboard,
        }
    }

    /// The draft body being previewed.
    #[inline]
    #[must_use]
    pub fn document(&self) -> &JsonValue {
        match self {
            Self::View { view, .. } => view,
            Self::Dashboard { dashboard } => dashboard,
        }
    }
}
