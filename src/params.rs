//! Negotiation parameters.

use serde::Deserialize;

use crate::error::{AuthError, Result};

/// Dotted OID of the Kerberos v5 mechanism, the default negotiation target.
pub const KRB5_MECHANISM_OID: &str = "1.2.840.113554.1.2.2";

/// Caller-supplied negotiation parameters, immutable once the context is
/// constructed.
///
/// `principal` and `realm` are mutually exclusive: a non-empty value for both
/// is a configuration error, reported on the first processing round before
/// any provider call.
///
/// The struct deserializes with per-field defaults so it can be embedded in a
/// host application's configuration:
///
/// ```yaml
/// kerberos:
///   realm: "EXAMPLE.COM"
///   target: "db/db01.example.com"
/// ```
///
/// # Example
///
/// ```
/// use gss_negotiate::{NegotiationParams, KRB5_MECHANISM_OID};
///
/// let params = NegotiationParams::new()
///     .with_principal("alice@EXAMPLE.COM")
///     .with_target("db/db01.example.com");
///
/// assert_eq!(params.mechanism, KRB5_MECHANISM_OID);
/// assert_eq!(params.principal, "alice@EXAMPLE.COM");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NegotiationParams {
    /// Expected mechanism OID; empty disables the post-negotiation mechanism
    /// check.
    pub mechanism: String,

    /// Initiator principal to acquire credentials for; empty selects the
    /// provider's default credential.
    pub principal: String,

    /// Expected realm of the negotiated identity; empty disables the check.
    pub realm: String,

    /// Target (acceptor) identity, e.g. a service principal; empty lets the
    /// provider resolve the target.
    pub target: String,

    /// Release the established security context as soon as negotiation
    /// succeeds. Disable to keep the context alive until the next reset.
    pub release_context_on_success: bool,
}

impl Default for NegotiationParams {
    fn default() -> Self {
        Self {
            mechanism: KRB5_MECHANISM_OID.to_string(),
            principal: String::new(),
            realm: String::new(),
            target: String::new(),
            release_context_on_success: true,
        }
    }
}

impl NegotiationParams {
    /// Create parameters with the Kerberos v5 mechanism and no identity
    /// expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expected mechanism OID (builder pattern).
    pub fn with_mechanism(mut self, mechanism: impl Into<String>) -> Self {
        self.mechanism = mechanism.into();
        self
    }

    /// Set the initiator principal (builder pattern).
    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = principal.into();
        self
    }

    /// Set the expected realm (builder pattern).
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Set the target identity (builder pattern).
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Keep the security context alive after a successful negotiation
    /// (builder pattern).
    pub fn retain_context_on_success(mut self) -> Self {
        self.release_context_on_success = false;
        self
    }

    /// Check the mutual-exclusion invariant on `principal` and `realm`.
    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_empty() && !self.realm.is_empty() {
            return Err(AuthError::Config(
                "realm and principal name cannot be specified simultaneously".into(),
            ));
        }
        Ok(())
    }
}
