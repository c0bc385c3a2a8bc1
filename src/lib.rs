//! gss-negotiate - Kerberos/GSS-API negotiation for database wire-protocol clients
//!
//! This library drives the client (initiator) side of a GSS-API security-context
//! negotiation on behalf of a database connection:
//! - Produces outbound opaque tokens for the transport and consumes inbound ones
//! - Repeats rounds until the context is established, fails, or needs more data
//! - Validates the negotiated identity (principal, realm, mechanism) against
//!   caller expectations
//! - Decodes provider status codes into a single error type
//!
//! The cryptographic exchange itself is delegated to a [`SecurityProvider`];
//! the system provider is available behind the `gssapi` cargo feature.

#[macro_use]
mod logging;

pub mod context;
pub mod credentials;
pub mod error;
pub mod handshake;
pub mod params;
pub mod principal;
pub mod protocol;
pub mod provider;

pub use context::{GssInitiatorContext, NegotiationStep};
pub use credentials::Credentials;
pub use error::{AuthError, Result};
pub use params::{NegotiationParams, KRB5_MECHANISM_OID};
pub use principal::PrincipalName;
pub use provider::{
    ContextFlags, CredHandle, CtxHandle, GssStatus, InitiateRequest, NameHandle, SecurityProvider,
    StatusKind, StepOutcome,
};
