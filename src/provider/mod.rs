//! Security-context provider capability interface.
//!
//! The negotiation engine never performs cryptography itself; it drives an
//! external mechanism-negotiation facility through the [`SecurityProvider`]
//! trait. The trait is synchronous, object-safe and `Send + Sync` so that a
//! `Arc<dyn SecurityProvider>` can be shared by every context in the process.
//!
//! # Serialization
//!
//! Provider implementations are not assumed to be thread-safe. Every call
//! sequence into a provider runs inside the process-wide re-entrant lock
//! returned by [`provider_lock`]; the lock is held for a whole processing
//! round, and re-entered by the status-message extractor when a failure is
//! being decoded.
//!
//! # Handles
//!
//! Names, credentials and security contexts live inside the provider and are
//! referenced through opaque [`NameHandle`]/[`CredHandle`]/[`CtxHandle`]
//! values. Handles are not clonable; releasing one consumes it, so a handle
//! can never be released twice.

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

mod messages;

#[cfg(feature = "gssapi")]
mod gssapi;

pub use messages::extract_status_messages;
pub(crate) use messages::describe_failure;

use crate::error::Result;

static PROVIDER_LOCK: ReentrantMutex<()> = ReentrantMutex::new(());

/// Acquire the process-wide provider serialization lock.
///
/// Re-entrant: a thread already inside the guarded region may acquire it
/// again (the status-message extractor does so while a round is decoding its
/// own failure).
pub fn provider_lock() -> ReentrantMutexGuard<'static, ()> {
    PROVIDER_LOCK.lock()
}

/// Opaque reference to a provider-held identity name.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct NameHandle(pub u64);

/// Opaque reference to a provider-held credential.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct CredHandle(pub u64);

/// Opaque reference to a provider-held security context.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct CtxHandle(pub u64);

/// Raw provider status pair, input to the status-message extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GssStatus {
    /// Mechanism-independent (major) status code.
    pub major: u32,
    /// Mechanism-specific (minor) status code.
    pub minor: u32,
}

/// Which of the two status code spaces a message lookup refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// Mechanism-independent codes.
    Gss,
    /// Mechanism-specific codes.
    Mech,
}

/// Negotiated context-flag bits, RFC 2744 values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextFlags(u32);

impl ContextFlags {
    /// Credential delegation was negotiated.
    pub const DELEGATE: ContextFlags = ContextFlags(0x01);
    /// Mutual authentication was negotiated.
    pub const MUTUAL: ContextFlags = ContextFlags(0x02);
    /// Replay detection is in effect.
    pub const REPLAY: ContextFlags = ContextFlags(0x04);
    /// Out-of-sequence detection is in effect.
    pub const SEQUENCE: ContextFlags = ContextFlags(0x08);
    /// Per-message confidentiality is available.
    pub const CONFIDENTIALITY: ContextFlags = ContextFlags(0x10);
    /// Per-message integrity is available.
    pub const INTEGRITY: ContextFlags = ContextFlags(0x20);
    /// The initiator did not reveal its identity to the acceptor.
    pub const ANONYMOUS: ContextFlags = ContextFlags(0x40);

    /// No flags set.
    pub const fn empty() -> Self {
        ContextFlags(0)
    }

    /// Raw bit representation.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        ContextFlags(bits)
    }

    /// True when every bit of `other` is set in `self`.
    pub const fn contains(self, other: ContextFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for ContextFlags {
    type Output = ContextFlags;

    fn bitor(self, rhs: ContextFlags) -> ContextFlags {
        ContextFlags(self.0 | rhs.0)
    }
}

/// One "initiate security context" step request.
///
/// `context` transfers ownership of the current security-context handle into
/// the provider for the duration of the call; the (possibly replaced) handle
/// comes back inside [`StepOutcome`]. On error the provider has already
/// disposed of the context, so the caller holds no dangling handle.
pub struct InitiateRequest<'a> {
    /// Credential to initiate with; `None` selects the provider default.
    pub credential: Option<&'a CredHandle>,

    /// Security context from the previous round; `None` on the first round.
    pub context: Option<CtxHandle>,

    /// Acceptor identity; `None` lets the provider resolve the target.
    pub target: Option<&'a NameHandle>,

    /// Token received from the peer; empty on the first round.
    pub input_token: &'a [u8],

    /// Requested negotiation flags.
    pub flags: ContextFlags,
}

/// Outcome of one successful initiate step.
pub enum StepOutcome {
    /// The security context is fully established.
    Complete {
        /// The established context.
        context: CtxHandle,
        /// Actually negotiated mechanism, as an OID string.
        mechanism: String,
        /// Negotiated initiator identity; ownership passes to the caller.
        initiator: NameHandle,
        /// Final token for the peer; may be empty.
        token: Vec<u8>,
        /// Negotiated flags.
        flags: ContextFlags,
    },

    /// The provider needs at least one more token from the peer.
    ContinueNeeded {
        /// The partially established context, to be passed back next round.
        context: CtxHandle,
        /// Token that must be sent to the peer.
        token: Vec<u8>,
    },
}

/// Narrow capability interface over an external GSS-style mechanism
/// negotiation facility.
///
/// All methods are blocking; callers serialize them through
/// [`provider_lock`]. Release methods are infallible and consume the handle.
pub trait SecurityProvider: Send + Sync {
    /// Import a textual identity into a provider-held name.
    fn import_name(&self, name: &str) -> std::result::Result<NameHandle, GssStatus>;

    /// Acquire an initiate-usage credential for an imported identity.
    fn acquire_initiate_credential(
        &self,
        initiator: &NameHandle,
    ) -> std::result::Result<CredHandle, GssStatus>;

    /// Run one security-context initiation step.
    fn initiate_context(
        &self,
        request: InitiateRequest<'_>,
    ) -> std::result::Result<StepOutcome, GssStatus>;

    /// Render a provider-held name as its display string.
    fn display_name(&self, name: &NameHandle) -> std::result::Result<String, GssStatus>;

    /// Render the next chained message for a status code.
    ///
    /// `message_context` carries the chain position between calls, starting
    /// at 0; the provider resets it to 0 when no further messages follow. A
    /// provider with nothing to say returns an empty string.
    fn status_message(
        &self,
        code: u32,
        kind: StatusKind,
        mechanism: Option<&str>,
        message_context: &mut u32,
    ) -> String;

    /// Compare two mechanism identifiers for equality.
    ///
    /// Textual encodings of the same OID may differ; the default
    /// implementation normalises dotted and braced spellings before
    /// comparing.
    fn mechanisms_equal(&self, left: &str, right: &str) -> bool {
        oid_text_equal(left, right)
    }

    /// Release an imported name.
    fn release_name(&self, name: NameHandle);

    /// Release an acquired credential.
    fn release_credential(&self, credential: CredHandle);

    /// Delete a security context.
    fn delete_context(&self, context: CtxHandle);
}

/// Obtain the system security provider.
///
/// Available when the crate is built with the `gssapi` feature; otherwise
/// every attempt reports [`AuthError::Unsupported`](crate::AuthError::Unsupported).
#[cfg(feature = "gssapi")]
pub fn system() -> Result<std::sync::Arc<dyn SecurityProvider>> {
    Ok(std::sync::Arc::new(gssapi::GssapiProvider::new()))
}

/// Obtain the system security provider.
///
/// Available when the crate is built with the `gssapi` feature; otherwise
/// every attempt reports [`AuthError::Unsupported`](crate::AuthError::Unsupported).
#[cfg(not(feature = "gssapi"))]
pub fn system() -> Result<std::sync::Arc<dyn SecurityProvider>> {
    Err(crate::error::AuthError::Unsupported)
}

/// OID equality over textual spellings.
///
/// Accepts dotted decimal (`1.2.840.113554.1.2.2`) and the braced form some
/// tools emit (`{ 1 2 840 113554 1 2 2 }`). Identifiers that do not parse as
/// OIDs fall back to trimmed string comparison.
pub(crate) fn oid_text_equal(left: &str, right: &str) -> bool {
    match (parse_oid_arcs(left), parse_oid_arcs(right)) {
        (Some(left_arcs), Some(right_arcs)) => left_arcs == right_arcs,
        _ => left.trim() == right.trim(),
    }
}

fn parse_oid_arcs(text: &str) -> Option<Vec<u64>> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or(trimmed);

    let arcs: Vec<u64> = body
        .split(|c: char| c == '.' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u64>().ok())
        .collect::<Option<Vec<u64>>>()?;

    if arcs.len() < 2 {
        return None;
    }
    Some(arcs)
}
