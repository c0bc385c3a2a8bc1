//! Authentication-outcome capability.

use crate::error::Result;

/// Capability exposed by any authentication strategy once its outcome is
/// known.
///
/// `is_ready` reports whether the outcome has been determined; note that a
/// permanently failed negotiation is also "ready" in this sense (the outcome
/// exists, it is just a failure). Identity accessors stay loud: querying a
/// name before completion, or after a failure, is a caller error rather than
/// a sentinel value.
pub trait Credentials {
    /// Resolved user name of the authenticated identity.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotReady`](crate::AuthError::NotReady) when the outcome
    /// is not yet determined or the negotiation failed.
    fn user_name(&self) -> Result<&str>;

    /// True once the outcome is determined (success or permanent failure).
    fn is_ready(&self) -> bool;
}
