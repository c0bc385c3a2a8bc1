//! Initiator-side negotiation context and state machine.
//!
//! [`GssInitiatorContext`] owns the negotiation parameters and the opaque
//! provider handles for one connection attempt, and drives the round-trip
//! state machine:
//!
//! ```text
//!              process_token (ContinueNeeded)
//!   [Idle] ─────────────────────────────────> [InProgress] ──┐
//!     │                                           │      ^   │ more rounds
//!     │ process_token (Complete)                  │      └───┘
//!     v                                           v
//! [Established]                               [Failed]
//! ```
//!
//! Both terminal states are "ready" (the outcome is determined); only
//! `Established` makes the identity accessors usable. A `process_token` call
//! on a terminal context resets it for a fresh attempt.

use std::sync::Arc;

use crate::credentials::Credentials;
use crate::error::{AuthError, Result};
use crate::params::NegotiationParams;
use crate::principal::PrincipalName;
use crate::provider::{
    self, ContextFlags, CredHandle, CtxHandle, InitiateRequest, NameHandle, SecurityProvider,
    StepOutcome,
};

/// Outcome of one successful processing round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationStep {
    /// The exchange is not finished; the token must be sent to the peer and
    /// the next peer token fed back in.
    ContinueNeeded(Vec<u8>),

    /// The security context is established. The token, when non-empty, is
    /// still sent to the peer as a finishing courtesy.
    Established(Vec<u8>),
}

impl NegotiationStep {
    /// Token to hand to the transport; may be empty.
    pub fn token(&self) -> &[u8] {
        match self {
            Self::ContinueNeeded(token) | Self::Established(token) => token,
        }
    }

    /// True for [`NegotiationStep::Established`].
    pub fn is_established(&self) -> bool {
        matches!(self, Self::Established(_))
    }
}

/// Client-side GSS security-context negotiation for one connection attempt.
///
/// Exclusively owned by its connection; not clonable. Handles are acquired
/// lazily on the first round and released deterministically on reset,
/// failure and drop.
///
/// # Example
///
/// ```no_run
/// use gss_negotiate::{GssInitiatorContext, NegotiationParams, NegotiationStep};
///
/// let params = NegotiationParams::new().with_target("db/db01.example.com");
/// let mut context = GssInitiatorContext::new(params);
///
/// let mut input: Vec<u8> = Vec::new();
/// loop {
///     match context.process_token(&input)? {
///         NegotiationStep::ContinueNeeded(token) => {
///             // send `token` to the peer, receive the next one into `input`
/// #           input = token;
///         }
///         NegotiationStep::Established(_token) => break,
///     }
/// }
/// # Ok::<(), gss_negotiate::AuthError>(())
/// ```
pub struct GssInitiatorContext {
    params: NegotiationParams,
    provider: Option<Arc<dyn SecurityProvider>>,

    is_ready: bool,
    is_failed: bool,
    user_name: String,
    realm: String,

    credential: Option<CredHandle>,
    security_context: Option<CtxHandle>,
    initiator_identity: Option<NameHandle>,
    target_identity: Option<NameHandle>,
}

impl GssInitiatorContext {
    /// Create a context backed by the system provider.
    ///
    /// In builds without the `gssapi` feature there is no system provider;
    /// construction still succeeds, and every processing round fails with
    /// [`AuthError::Unsupported`].
    pub fn new(params: NegotiationParams) -> Self {
        Self::with_provider_slot(params, provider::system().ok())
    }

    /// Create a context driving an explicit provider.
    pub fn with_provider(params: NegotiationParams, provider: Arc<dyn SecurityProvider>) -> Self {
        Self::with_provider_slot(params, Some(provider))
    }

    fn with_provider_slot(
        params: NegotiationParams,
        provider: Option<Arc<dyn SecurityProvider>>,
    ) -> Self {
        Self {
            params,
            provider,
            is_ready: false,
            is_failed: false,
            user_name: String::new(),
            realm: String::new(),
            credential: None,
            security_context: None,
            initiator_identity: None,
            target_identity: None,
        }
    }

    /// Negotiation parameters this context was created with.
    pub fn params(&self) -> &NegotiationParams {
        &self.params
    }

    /// True once the outcome is determined, whether success or permanent
    /// failure.
    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    /// True when the negotiation ended in failure.
    pub fn is_failed(&self) -> bool {
        self.is_failed
    }

    /// Realm of the negotiated identity.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotReady`] unless the negotiation completed successfully.
    pub fn realm(&self) -> Result<&str> {
        if !self.is_ready || self.is_failed {
            return Err(AuthError::NotReady);
        }
        Ok(&self.realm)
    }

    /// User name of the negotiated identity.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotReady`] unless the negotiation completed successfully.
    pub fn user_name(&self) -> Result<&str> {
        if !self.is_ready || self.is_failed {
            return Err(AuthError::NotReady);
        }
        Ok(&self.user_name)
    }

    /// Run one negotiation round over an inbound peer token.
    ///
    /// The first round of an attempt takes an empty token. The provider call
    /// sequence of the whole round runs inside the process-wide provider
    /// lock. Any error forces the context into the failed terminal state,
    /// releases every held handle, and propagates to the caller; the next
    /// call on the context starts a fresh attempt.
    pub fn process_token(&mut self, input_token: &[u8]) -> Result<NegotiationStep> {
        let _guard = provider::provider_lock();

        match self.process_round(input_token) {
            Ok(step) => Ok(step),
            Err(err) => {
                error!(error = %err, "could not process GSS token");
                self.is_ready = true;
                self.is_failed = true;
                self.reset_handles();
                Err(err)
            }
        }
    }

    fn process_round(&mut self, input_token: &[u8]) -> Result<NegotiationStep> {
        let provider = self.provider.clone().ok_or(AuthError::Unsupported)?;

        if self.is_ready || self.is_failed || self.security_context.is_none() {
            self.reset(provider.as_ref())?;
        }

        let outcome = provider
            .initiate_context(InitiateRequest {
                credential: self.credential.as_ref(),
                context: self.security_context.take(),
                target: self.target_identity.as_ref(),
                input_token,
                flags: ContextFlags::empty(),
            })
            .map_err(|status| {
                AuthError::Negotiation(provider::describe_failure(
                    provider.as_ref(),
                    "initiating the security context",
                    status,
                    mechanism_of(&self.params.mechanism),
                ))
            })?;

        match outcome {
            StepOutcome::Complete {
                context,
                mechanism,
                initiator,
                token,
                flags,
            } => {
                self.security_context = Some(context);

                // The negotiated identity must not outlive this round
                // whatever the checks below decide.
                let display = provider.display_name(&initiator).unwrap_or_default();
                provider.release_name(initiator);

                if !self.params.mechanism.is_empty()
                    && !provider.mechanisms_equal(&self.params.mechanism, &mechanism)
                {
                    return Err(AuthError::Policy(
                        "the security context was established, but the authentication \
                         mechanism is not what was expected"
                            .into(),
                    ));
                }

                if flags.contains(ContextFlags::ANONYMOUS) {
                    return Err(AuthError::Policy(
                        "the security context was established, but the initiator does \
                         not wish to be authenticated"
                            .into(),
                    ));
                }

                let principal = PrincipalName::parse(&display);
                self.user_name = principal.name;
                self.realm = principal.realm;

                if self.user_name.is_empty() {
                    return Err(AuthError::Policy(
                        "the security context was established, but the initiator name \
                         cannot be extracted"
                            .into(),
                    ));
                }

                if self.realm.is_empty() {
                    return Err(AuthError::Policy(
                        "the security context was established, but the initiator realm \
                         cannot be extracted"
                            .into(),
                    ));
                }

                if !self.params.realm.is_empty() && self.params.realm != self.realm {
                    return Err(AuthError::Policy(format!(
                        "the security context was established, but the initiator realm \
                         is not what was expected (expected: {}, actual: {})",
                        self.params.realm, self.realm
                    )));
                }

                self.is_ready = true;
                self.is_failed = false;

                if self.params.release_context_on_success {
                    if let Some(context) = self.security_context.take() {
                        provider.delete_context(context);
                    }
                }

                debug!(
                    user_name = %self.user_name,
                    realm = %self.realm,
                    "security context established"
                );

                Ok(NegotiationStep::Established(token))
            }

            StepOutcome::ContinueNeeded { context, token } => {
                self.security_context = Some(context);
                self.is_ready = false;
                self.is_failed = false;

                debug!(token_len = token.len(), "negotiation continues");

                Ok(NegotiationStep::ContinueNeeded(token))
            }
        }
    }

    /// Clear derived state and re-acquire handles for a fresh attempt.
    fn reset(&mut self, provider: &dyn SecurityProvider) -> Result<()> {
        debug!("resetting negotiation state");

        self.is_ready = false;
        self.is_failed = false;
        self.user_name.clear();
        self.realm.clear();

        self.init_handles(provider)
    }

    fn init_handles(&mut self, provider: &dyn SecurityProvider) -> Result<()> {
        self.reset_handles();

        self.params.validate()?;

        if !self.params.principal.is_empty() {
            let initiator = provider.import_name(&self.params.principal).map_err(|status| {
                AuthError::ProviderRejected(provider::describe_failure(
                    provider,
                    "importing the initiator principal",
                    status,
                    None,
                ))
            })?;
            let acquired = provider.acquire_initiate_credential(&initiator);
            self.initiator_identity = Some(initiator);

            self.credential = Some(acquired.map_err(|status| {
                AuthError::ProviderRejected(provider::describe_failure(
                    provider,
                    "acquiring initiator credentials",
                    status,
                    None,
                ))
            })?);
        }

        if !self.params.target.is_empty() {
            let target = provider.import_name(&self.params.target).map_err(|status| {
                AuthError::ProviderRejected(provider::describe_failure(
                    provider,
                    "importing the target identity",
                    status,
                    None,
                ))
            })?;
            self.target_identity = Some(target);
        }

        Ok(())
    }

    /// Release every held handle and null the slots.
    ///
    /// Idempotent: released slots are `None` and skipped, so a second reset
    /// cannot double-release.
    fn reset_handles(&mut self) {
        let Some(provider) = self.provider.clone() else {
            return;
        };
        let _guard = provider::provider_lock();

        if let Some(credential) = self.credential.take() {
            provider.release_credential(credential);
        }
        if let Some(context) = self.security_context.take() {
            provider.delete_context(context);
        }
        if let Some(name) = self.initiator_identity.take() {
            provider.release_name(name);
        }
        if let Some(name) = self.target_identity.take() {
            provider.release_name(name);
        }
    }
}

impl Drop for GssInitiatorContext {
    fn drop(&mut self) {
        self.reset_handles();
    }
}

impl Credentials for GssInitiatorContext {
    fn user_name(&self) -> Result<&str> {
        GssInitiatorContext::user_name(self)
    }

    fn is_ready(&self) -> bool {
        GssInitiatorContext::is_ready(self)
    }
}

fn mechanism_of(mechanism: &str) -> Option<&str> {
    if mechanism.is_empty() {
        None
    } else {
        Some(mechanism)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{GssStatus, StatusKind};
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    /// Scripted provider: pops one reply per initiate step and tracks live
    /// handles plus every call made against it.
    struct ScriptedProvider {
        replies: Mutex<Vec<Reply>>,
        live: Mutex<HashSet<u64>>,
        display: Mutex<HashMap<u64, String>>,
        calls: Mutex<Vec<String>>,
        next_handle: AtomicU64,
    }

    enum Reply {
        Continue,
        Complete {
            mechanism: &'static str,
            identity: &'static str,
            flags: ContextFlags,
        },
        Fail(GssStatus),
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies),
                live: Mutex::new(HashSet::new()),
                display: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
                next_handle: AtomicU64::new(1),
            }
        }

        fn mint(&self) -> u64 {
            let id = self.next_handle.fetch_add(1, Ordering::SeqCst);
            self.live.lock().unwrap().insert(id);
            id
        }

        fn retire(&self, id: u64) {
            assert!(
                self.live.lock().unwrap().remove(&id),
                "released handle {id} twice or never minted it"
            );
        }

        fn live_handles(&self) -> usize {
            self.live.lock().unwrap().len()
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }
    }

    impl SecurityProvider for ScriptedProvider {
        fn import_name(&self, name: &str) -> std::result::Result<NameHandle, GssStatus> {
            self.record(&format!("import:{name}"));
            Ok(NameHandle(self.mint()))
        }

        fn acquire_initiate_credential(
            &self,
            _initiator: &NameHandle,
        ) -> std::result::Result<CredHandle, GssStatus> {
            self.record("acquire_credential");
            Ok(CredHandle(self.mint()))
        }

        fn initiate_context(
            &self,
            request: InitiateRequest<'_>,
        ) -> std::result::Result<StepOutcome, GssStatus> {
            self.record("initiate");

            let context = match request.context {
                Some(context) => context,
                None => CtxHandle(self.mint()),
            };

            let reply = self.replies.lock().unwrap().remove(0);
            match reply {
                Reply::Continue => Ok(StepOutcome::ContinueNeeded {
                    context,
                    token: b"continue-token".to_vec(),
                }),
                Reply::Complete {
                    mechanism,
                    identity,
                    flags,
                } => {
                    let initiator = NameHandle(self.mint());
                    self.display
                        .lock()
                        .unwrap()
                        .insert(initiator.0, identity.to_string());
                    Ok(StepOutcome::Complete {
                        context,
                        mechanism: mechanism.to_string(),
                        initiator,
                        token: b"final-token".to_vec(),
                        flags,
                    })
                }
                Reply::Fail(status) => {
                    self.retire(context.0);
                    Err(status)
                }
            }
        }

        fn display_name(&self, name: &NameHandle) -> std::result::Result<String, GssStatus> {
            Ok(self
                .display
                .lock()
                .unwrap()
                .get(&name.0)
                .cloned()
                .unwrap_or_default())
        }

        fn status_message(
            &self,
            code: u32,
            kind: StatusKind,
            _mechanism: Option<&str>,
            message_context: &mut u32,
        ) -> String {
            *message_context = 0;
            match (code, kind) {
                (0, _) => String::new(),
                (code, StatusKind::Gss) => format!("major status {code}"),
                (code, StatusKind::Mech) => format!("minor status {code}"),
            }
        }

        fn release_name(&self, name: NameHandle) {
            self.retire(name.0);
        }

        fn release_credential(&self, credential: CredHandle) {
            self.retire(credential.0);
        }

        fn delete_context(&self, context: CtxHandle) {
            self.retire(context.0);
        }
    }

    fn complete_reply(identity: &'static str) -> Reply {
        Reply::Complete {
            mechanism: crate::KRB5_MECHANISM_OID,
            identity,
            flags: ContextFlags::empty(),
        }
    }

    fn context_with(
        params: NegotiationParams,
        replies: Vec<Reply>,
    ) -> (GssInitiatorContext, Arc<ScriptedProvider>) {
        let provider = Arc::new(ScriptedProvider::new(replies));
        let context = GssInitiatorContext::with_provider(params, provider.clone());
        (context, provider)
    }

    #[test]
    fn test_single_round_success() {
        let (mut context, provider) = context_with(
            NegotiationParams::new(),
            vec![complete_reply("alice@EXAMPLE.COM")],
        );

        let step = context.process_token(&[]).expect("round succeeds");
        assert_eq!(step, NegotiationStep::Established(b"final-token".to_vec()));

        assert!(context.is_ready());
        assert!(!context.is_failed());
        assert_eq!(context.user_name().unwrap(), "alice");
        assert_eq!(context.realm().unwrap(), "EXAMPLE.COM");

        // Released on success: the security context and the transient
        // negotiated identity; the default-credential path acquired nothing
        // else.
        assert_eq!(provider.live_handles(), 0);
    }

    #[test]
    fn test_continue_rounds_keep_handles() {
        let (mut context, provider) = context_with(
            NegotiationParams::new().with_principal("alice@EXAMPLE.COM"),
            vec![Reply::Continue, Reply::Continue, complete_reply("alice@EXAMPLE.COM")],
        );

        let step = context.process_token(&[]).expect("round 1");
        assert_eq!(step, NegotiationStep::ContinueNeeded(b"continue-token".to_vec()));
        assert!(!context.is_ready());
        assert!(!context.is_failed());
        // initiator identity + credential + security context stay allocated
        let live_after_first = provider.live_handles();
        assert_eq!(live_after_first, 3);

        let step = context.process_token(b"peer-token").expect("round 2");
        assert!(!step.is_established());
        assert_eq!(provider.live_handles(), live_after_first);
        // No re-import between ContinueNeeded rounds.
        assert_eq!(
            provider
                .calls()
                .iter()
                .filter(|call| call.starts_with("import:"))
                .count(),
            1
        );

        let step = context.process_token(b"peer-token-2").expect("round 3");
        assert!(step.is_established());
        assert!(context.is_ready());
        assert_eq!(context.user_name().unwrap(), "alice");
    }

    #[test]
    fn test_principal_and_realm_fails_before_any_provider_call() {
        let (mut context, provider) = context_with(
            NegotiationParams::new()
                .with_principal("alice@EXAMPLE.COM")
                .with_realm("EXAMPLE.COM"),
            vec![],
        );

        let err = context.process_token(&[]).unwrap_err();
        assert!(matches!(err, AuthError::Config(_)));
        assert!(context.is_failed());
        assert!(context.is_ready());
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn test_mechanism_mismatch_is_terminal_and_releases_handles() {
        let (mut context, provider) = context_with(
            NegotiationParams::new().with_principal("alice@EXAMPLE.COM"),
            vec![Reply::Complete {
                mechanism: "1.3.6.1.5.5.2",
                identity: "alice@EXAMPLE.COM",
                flags: ContextFlags::empty(),
            }],
        );

        let err = context.process_token(&[]).unwrap_err();
        assert!(matches!(err, AuthError::Policy(_)));
        assert!(err.to_string().contains("mechanism is not what was expected"));
        assert!(context.is_failed());
        assert!(context.is_ready());
        assert_eq!(provider.live_handles(), 0);
    }

    #[test]
    fn test_mechanism_comparison_tolerates_braced_encoding() {
        let (mut context, _provider) = context_with(
            NegotiationParams::new(),
            vec![Reply::Complete {
                mechanism: "{ 1 2 840 113554 1 2 2 }",
                identity: "alice@EXAMPLE.COM",
                flags: ContextFlags::empty(),
            }],
        );

        assert!(context.process_token(&[]).is_ok());
        assert!(!context.is_failed());
    }

    #[test]
    fn test_anonymous_initiator_rejected() {
        let (mut context, provider) = context_with(
            NegotiationParams::new(),
            vec![Reply::Complete {
                mechanism: crate::KRB5_MECHANISM_OID,
                identity: "alice@EXAMPLE.COM",
                flags: ContextFlags::ANONYMOUS,
            }],
        );

        let err = context.process_token(&[]).unwrap_err();
        assert!(matches!(err, AuthError::Policy(_)));
        assert!(err.to_string().contains("does not wish to be authenticated"));
        assert!(context.is_failed());
        assert_eq!(provider.live_handles(), 0);
    }

    #[test]
    fn test_unextractable_name_and_realm_fail() {
        for identity in ["", "@EXAMPLE.COM", "alice"] {
            let (mut context, provider) =
                context_with(NegotiationParams::new(), vec![complete_reply(identity)]);

            let err = context.process_token(&[]).unwrap_err();
            assert!(matches!(err, AuthError::Policy(_)), "identity {identity:?}");
            assert!(context.is_failed(), "identity {identity:?}");
            assert_eq!(provider.live_handles(), 0, "identity {identity:?}");
        }
    }

    #[test]
    fn test_realm_mismatch_names_both_realms() {
        let (mut context, _provider) = context_with(
            NegotiationParams::new().with_realm("EXAMPLE.COM"),
            vec![complete_reply("alice@OTHER.ORG")],
        );

        let err = context.process_token(&[]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("expected: EXAMPLE.COM"));
        assert!(message.contains("actual: OTHER.ORG"));
        assert!(context.is_failed());
    }

    #[test]
    fn test_accessors_fail_after_failure() {
        let (mut context, _provider) = context_with(
            NegotiationParams::new().with_realm("EXAMPLE.COM"),
            vec![complete_reply("alice@OTHER.ORG")],
        );

        context.process_token(&[]).unwrap_err();

        // The realm was extracted before the mismatch was detected, but the
        // failed context must not hand it out.
        assert!(matches!(context.realm(), Err(AuthError::NotReady)));
        assert!(matches!(context.user_name(), Err(AuthError::NotReady)));
    }

    #[test]
    fn test_accessors_fail_before_completion() {
        let (mut context, _provider) =
            context_with(NegotiationParams::new(), vec![Reply::Continue]);

        assert!(matches!(context.realm(), Err(AuthError::NotReady)));

        context.process_token(&[]).expect("round 1");
        assert!(matches!(context.user_name(), Err(AuthError::NotReady)));
    }

    #[test]
    fn test_terminal_context_resets_on_next_round() {
        let (mut context, provider) = context_with(
            NegotiationParams::new().with_principal("alice@EXAMPLE.COM"),
            vec![
                complete_reply("alice@EXAMPLE.COM"),
                complete_reply("alice@EXAMPLE.COM"),
            ],
        );

        context.process_token(&[]).expect("first attempt");
        assert!(context.is_ready());

        // Second attempt on an established context: fresh import + acquire.
        context.process_token(&[]).expect("second attempt");
        assert_eq!(
            provider
                .calls()
                .iter()
                .filter(|call| *call == "acquire_credential")
                .count(),
            2
        );
        assert!(context.is_ready());
        assert!(!context.is_failed());
        assert_eq!(context.user_name().unwrap(), "alice");
    }

    #[test]
    fn test_failed_context_resets_on_next_round() {
        let (mut context, _provider) = context_with(
            NegotiationParams::new(),
            vec![
                Reply::Fail(GssStatus {
                    major: 851968,
                    minor: 2529638919,
                }),
                complete_reply("alice@EXAMPLE.COM"),
            ],
        );

        let err = context.process_token(&[]).unwrap_err();
        assert!(matches!(err, AuthError::Negotiation(_)));
        assert!(err.to_string().contains("major status 851968"));
        assert!(err.to_string().contains("minor status 2529638919"));
        assert!(context.is_failed());

        context.process_token(&[]).expect("fresh attempt succeeds");
        assert!(context.is_ready());
        assert!(!context.is_failed());
    }

    #[test]
    fn test_retain_context_on_success_keeps_handle() {
        let (mut context, provider) = context_with(
            NegotiationParams::new().retain_context_on_success(),
            vec![complete_reply("alice@EXAMPLE.COM")],
        );

        context.process_token(&[]).expect("round succeeds");
        assert!(context.is_ready());
        // The established security context stays live until reset or drop.
        assert_eq!(provider.live_handles(), 1);

        drop(context);
        assert_eq!(provider.live_handles(), 0);
    }

    #[test]
    fn test_drop_releases_mid_negotiation_handles() {
        let (mut context, provider) = context_with(
            NegotiationParams::new().with_principal("alice@EXAMPLE.COM"),
            vec![Reply::Continue],
        );

        context.process_token(&[]).expect("round 1");
        assert!(provider.live_handles() > 0);

        drop(context);
        assert_eq!(provider.live_handles(), 0);
    }

    #[test]
    fn test_double_reset_does_not_double_release() {
        let (mut context, provider) = context_with(
            NegotiationParams::new(),
            vec![Reply::Fail(GssStatus { major: 1, minor: 0 })],
        );

        context.process_token(&[]).unwrap_err();
        // Failure already released everything; the mock panics on a second
        // release of the same handle, so dropping must observe empty slots.
        assert_eq!(provider.live_handles(), 0);
        drop(context);
        assert_eq!(provider.live_handles(), 0);
    }

    #[test]
    fn test_credentials_trait_view() {
        let (mut context, _provider) = context_with(
            NegotiationParams::new(),
            vec![complete_reply("alice@EXAMPLE.COM")],
        );

        context.process_token(&[]).expect("round succeeds");

        let credentials: &dyn Credentials = &context;
        assert!(credentials.is_ready());
        assert_eq!(credentials.user_name().unwrap(), "alice");
    }
}
