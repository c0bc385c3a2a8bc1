//! Error types for gss-negotiate.

use thiserror::Error;

/// Main error type for the negotiation engine.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Mutually exclusive or otherwise invalid negotiation parameters.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The provider rejected an identity import or credential acquisition.
    #[error("Provider rejected request: {0}")]
    ProviderRejected(String),

    /// The provider reported a hard failure while establishing the context.
    #[error("Negotiation error: {0}")]
    Negotiation(String),

    /// The exchange completed but the negotiated outcome violates caller
    /// expectations (mechanism, anonymity, identity or realm checks).
    #[error("Policy violation: {0}")]
    Policy(String),

    /// Identity or realm queried before the negotiation completed, or after
    /// it failed.
    #[error("Authentication context is not ready")]
    NotReady,

    /// The security-context provider is unavailable in this build.
    #[error("Built without GSS-API/Kerberos support")]
    Unsupported,

    /// I/O error from the transport during the handshake.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for AuthError
pub type Result<T> = std::result::Result<T, AuthError>;
