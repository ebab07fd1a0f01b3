//! Redirect-to-login capability
//!
//! How re-authentication actually happens is owned by the surrounding
//! shell; the HTTP layer only reports that the service said "unauthorized"
//! and pokes this capability when one is installed.

/// Shell capability invoked when the service rejects the session.
pub trait Navigator: Send + Sync {
    /// Send the user back through the login entry point.
    fn redirect_to_login(&self);
}
