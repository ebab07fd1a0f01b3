//! Parameter schema extraction
//!
//! A draft may declare the inputs it accepts under a `parameters` sub-tree
//! shaped like a restricted JSON-Schema object node:
//!
//! ```yaml
//! parameters:
//!   properties:
//!     limit:
//!       type: string
//!   required: [limit]
//! ```
//!
//! Extraction is tolerant: a missing or malformed section yields an empty
//! schema. Unknown declared types are carried through verbatim so the
//! parameter form can say "unsupported type" instead of silently dropping
//! the field.

use crate::document::Document;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    /// The only type the preview form currently substitutes
    String,
    /// Any other type name, preserved verbatim
    Other(String),
}

impl DeclaredType {
    fn from_name(name: &str) -> Self {
        match name {
            "string" => Self::String,
            other => Self::Other(other.to_string()),
        }
    }

    /// The declared type name as written in the source.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Other(name) => name,
        }
    }

    /// True when the form can collect a value of this type.
    #[inline]
    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::String)
    }
}

impl std::fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor for one declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Declared type, unsupported names preserved
    pub declared_type: DeclaredType,
    /// Whether the name appears in the schema's `required` list
    pub required: bool,
}

/// The set of named, typed inputs a draft declares it accepts.
///
/// Property order follows the declaration order in the source, so the
/// parameter form renders fields the way the author wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSchema {
    properties: IndexMap<String, PropertyDescriptor>,
    required: Vec<String>,
}

impl ParameterSchema {
    /// Derive the schema from a draft's `parameters` sub-tree.
    ///
    /// Returns an empty schema when the draft has no `parameters` section.
    #[must_use]
    pub fn extract(document: &Document) -> Self {
        match document.body().get("parameters") {
            Some(section) => Self::from_section(section),
            None => Self::default(),
        }
    }

    fn from_section(section: &JsonValue) -> Self {
        let required: Vec<String> = section
            .get("required")
            .and_then(JsonValue::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(JsonValue::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let mut properties = IndexMap::new();
        if let Some(nodes) = section.get("properties").and_then(JsonValue::as_object) {
            for (name, node) in nodes {
                // Entries without a string `type` are malformed; skip them.
                let Some(type_name) = node.get("type").and_then(JsonValue::as_str) else {
                    continue;
                };
                properties.insert(
                    name.clone(),
                    PropertyDescriptor {
                        declared_type: DeclaredType::from_name(type_name),
                        required: required.iter().any(|r| r == name),
                    },
                );
            }
        }

        Self {
            properties,
            required,
        }
    }

    /// True when the draft declares no parameters.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Number of declared parameters.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether a name is declared by the current schema.
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Descriptor for one declared parameter.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }

    /// Declared parameters in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyDescriptor)> {
        self.properties.iter().map(|(name, desc)| (name.as_str(), desc))
    }

    /// Required names in the order the schema listed them.
    #[inline]
    #[must_use]
    pub fn required_names(&self) -> &[String] {
        &self.required
    }
}
