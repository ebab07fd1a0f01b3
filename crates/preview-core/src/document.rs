//! Document drafts and source parsing
//!
//! Turns raw, human-authored YAML source into a structured draft and
//! enforces the fields each document kind requires before anything reaches
//! the evaluation service.

use crate::error::ParseError;
use serde_json::Value as JsonValue;

/// Recognized draft kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A query view: `selector` + `data`
    View,
    /// A dashboard composing saved views: `view` + `layout`
    Dashboard,
}

impl DocumentKind {
    /// Fields a draft of this kind must contain, in the order they are
    /// checked (and therefore the order missing-field errors surface).
    #[inline]
    #[must_use]
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::View => &["data", "selector"],
            Self::Dashboard => &["view", "layout"],
        }
    }

    /// Lowercase name used on the wire and in logs.
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Dashboard => "dashboard",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed, kind-checked draft of an entity definition.
///
/// Drafts carry no identity: any top-level `id` in the source is stripped
/// during parsing, so a preview can never collide with (or depend on) a
/// persisted document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    kind: DocumentKind,
    body: JsonValue,
}

impl Document {
    /// Parse raw source text into a draft.
    ///
    /// Blank input (empty or whitespace-only) is the distinguished
    /// "no document yet" state and returns `Ok(None)` rather than an error;
    /// downstream stages skip evaluation without clearing earlier results.
    ///
    /// # Errors
    /// - `ParseError::Syntax` when the source is not well-formed YAML
    /// - `ParseError::MissingField` when a kind-required field is absent
    pub fn parse(kind: DocumentKind, raw: &str) -> Result<Option<Self>, ParseError> {
        if raw.trim().is_empty() {
            return Ok(None);
        }

        let mut body: JsonValue = serde_yaml::from_str(raw).map_err(|e| ParseError::Syntax {
            message: e.to_string(),
        })?;

        if let Some(map) = body.as_object_mut() {
            map.shift_remove("id");
        }

        for field in kind.required_fields() {
            if body.get(field).is_none() {
                return Err(ParseError::MissingField { field });
            }
        }

        tracing::trace!(kind = %kind, "parsed draft");
        Ok(Some(Self { kind, body }))
    }

    /// The draft's kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// The parsed body, id stripped.
    #[inline]
    #[must_use]
    pub fn body(&self) -> &JsonValue {
        &self.body
    }

    /// Consume the draft, yielding its body.
    #[inline]
    #[must_use]
    pub fn into_body(self) -> JsonValue {
        self.body
    }
}
