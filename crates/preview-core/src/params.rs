//! User-entered parameter values
//!
//! The store keeps everything the user ever typed, including values for
//! names the current schema no longer declares (the draft may re-introduce
//! them), and filters at reconcile time so stale keys are never sent to the
//! evaluation service.

use crate::schema::ParameterSchema;
use indexmap::IndexMap;

/// Parameter values entered through the preview form.
///
/// A stored `None` means "the user cleared the field"; empty-string edits
/// normalize to `None` on the way in.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    values: IndexMap<String, Option<String>>,
}

impl ParameterStore {
    /// Create an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw edit from the form.
    pub fn set_value(&mut self, name: impl Into<String>, raw: &str) {
        let value = if raw.is_empty() {
            None
        } else {
            Some(raw.to_string())
        };
        self.values.insert(name.into(), value);
    }

    /// Current non-null value for a name, if any.
    #[inline]
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.as_deref())
    }

    /// Filter stored values against the live schema.
    ///
    /// The result contains only names the schema declares whose stored value
    /// is non-null, ordered by schema declaration order. Recomputed on every
    /// cycle so keys from an earlier schema version never leak out.
    #[must_use]
    pub fn reconcile(&self, schema: &ParameterSchema) -> IndexMap<String, String> {
        schema
            .properties()
            .filter_map(|(name, _)| {
                self.value(name)
                    .map(|value| (name.to_string(), value.to_string()))
            })
            .collect()
    }

    /// Names the user has touched that the current schema does not declare.
    ///
    /// Reported inline in the parameter form; never sent to the server.
    #[must_use]
    pub fn unknown_parameters(&self, schema: &ParameterSchema) -> Vec<String> {
        self.values
            .keys()
            .filter(|name| !schema.contains(name))
            .cloned()
            .collect()
    }

    /// Number of stored entries, cleared fields included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the user has not touched any field.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
