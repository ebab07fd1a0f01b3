//! Preview Core - live preview evaluation pipeline
//!
//! The engine behind the admin UI's preview panel:
//! - Parses in-progress YAML source into structured drafts
//! - Derives the declared parameter schema from a draft
//! - Coalesces rapid edits with independent debounce windows
//! - Filters user-entered parameters against the live schema
//! - Sequences evaluation cycles so a stale response can never overwrite
//!   the result of a newer request
//!
//! The crate is transport-agnostic: the network call is behind the
//! [`driver::EvaluationClient`] trait, implemented by `preview-client`.
//!
//! # Example
//!
//! ```rust,ignore
//! use preview_core::prelude::*;
//! use std::sync::Arc;
//!
//! let client: Arc<dyn EvaluationClient> = Arc::new(my_client);
//! let session = SessionHandle::spawn(DocumentKind::View, SessionConfig::new(), client);
//!
//! session.source_changed("selector: {entityKind: X}\ndata: {v: 1}");
//! let mut state = session.state();
//! // state.changed().await; state.borrow().last_good ...
//! ```

pub mod debounce;
pub mod document;
pub mod driver;
pub mod error;
pub mod params;
pub mod request;
pub mod schema;
pub mod session;
pub mod state;

// Re-exports for convenience
pub use debounce::Debouncer;
pub use document::{Document, DocumentKind};
pub use driver::{EvaluationClient, SessionConfig, SessionHandle};
pub use error::{DefinitionIssue, ParseError, PreviewError};
pub use params::ParameterStore;
pub use request::PreviewRequest;
pub use schema::{DeclaredType, ParameterSchema, PropertyDescriptor};
pub use session::{
    Applied, CycleOutcome, PendingEvaluation, PreviewResult, PreviewSession, SessionState,
};
pub use state::{allowed_transitions, validate_transition, SessionPhase, Settlement};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the preview pipeline
    pub use crate::{
        DocumentKind, EvaluationClient, PreviewError, PreviewResult, SessionConfig, SessionHandle,
        SessionPhase, SessionState,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
