//! Diagnostic message extraction for provider status pairs.

use super::{GssStatus, SecurityProvider, StatusKind};

/// Collect every chained message the provider holds for one status code.
///
/// Messages of the same kind are joined with `", "`. Runs inside the global
/// provider lock; safe to call while a round already holds it.
fn extract_kind_messages(
    provider: &dyn SecurityProvider,
    code: u32,
    kind: StatusKind,
    mechanism: Option<&str>,
) -> String {
    let _guard = super::provider_lock();

    let mut messages = String::new();
    let mut message_context = 0u32;

    loop {
        let message = provider.status_message(code, kind, mechanism, &mut message_context);

        if !message.is_empty() {
            if !messages.is_empty() {
                messages.push_str(", ");
            }
            messages.push_str(&message);
        }

        if message_context == 0 {
            break;
        }
    }

    messages
}

/// Translate a status pair into a single human-readable diagnostic.
///
/// The mechanism-independent side is rendered as `"Majors: <...>"`, the
/// mechanism-specific side as `"Minors: <...>"`, joined with `"; "`; an empty
/// side is omitted. Never fails: a provider with no messages yields an empty
/// string, which callers treat as "no additional diagnostic available".
pub fn extract_status_messages(
    provider: &dyn SecurityProvider,
    status: GssStatus,
    mechanism: Option<&str>,
) -> String {
    let _guard = super::provider_lock();

    let gss_messages = extract_kind_messages(provider, status.major, StatusKind::Gss, mechanism);
    let mech_messages = extract_kind_messages(provider, status.minor, StatusKind::Mech, mechanism);

    let mut messages = String::new();

    if !gss_messages.is_empty() {
        messages.push_str("Majors: ");
        messages.push_str(&gss_messages);
    }

    if !mech_messages.is_empty() {
        if !messages.is_empty() {
            messages.push_str("; ");
        }
        messages.push_str("Minors: ");
        messages.push_str(&mech_messages);
    }

    trace!(major = status.major, minor = status.minor, "decoded provider status");

    messages
}

/// Append decoded diagnostics to an operation description, matching the
/// `"<operation> failed: <messages>"` shape used in error text.
pub(crate) fn describe_failure(
    provider: &dyn SecurityProvider,
    operation: &str,
    status: GssStatus,
    mechanism: Option<&str>,
) -> String {
    let messages = extract_status_messages(provider, status, mechanism);
    if messages.is_empty() {
        format!("{operation} failed")
    } else {
        format!("{operation} failed: {messages}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{
        CredHandle, CtxHandle, InitiateRequest, NameHandle, StepOutcome,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Provider stub that only knows how to chain status messages.
    struct ChainedMessages {
        by_code: Mutex<HashMap<(u32, StatusKind), Vec<&'static str>>>,
    }

    impl ChainedMessages {
        fn new(entries: &[(u32, StatusKind, &[&'static str])]) -> Self {
            let mut by_code = HashMap::new();
            for (code, kind, messages) in entries {
                by_code.insert((*code, *kind), messages.to_vec());
            }
            Self {
                by_code: Mutex::new(by_code),
            }
        }
    }

    impl SecurityProvider for ChainedMessages {
        fn import_name(&self, _name: &str) -> Result<NameHandle, GssStatus> {
            unimplemented!("not used by message extraction")
        }

        fn acquire_initiate_credential(
            &self,
            _initiator: &NameHandle,
        ) -> Result<CredHandle, GssStatus> {
            unimplemented!("not used by message extraction")
        }

        fn initiate_context(
            &self,
            _request: InitiateRequest<'_>,
        ) -> Result<StepOutcome, GssStatus> {
            unimplemented!("not used by message extraction")
        }

        fn display_name(&self, _name: &NameHandle) -> Result<String, GssStatus> {
            unimplemented!("not used by message extraction")
        }

        fn status_message(
            &self,
            code: u32,
            kind: StatusKind,
            _mechanism: Option<&str>,
            message_context: &mut u32,
        ) -> String {
            let by_code = self.by_code.lock().unwrap();
            let Some(chain) = by_code.get(&(code, kind)) else {
                *message_context = 0;
                return String::new();
            };

            let index = *message_context as usize;
            let message = chain.get(index).copied().unwrap_or_default();
            *message_context = if index + 1 < chain.len() {
                *message_context + 1
            } else {
                0
            };
            message.to_string()
        }

        fn release_name(&self, _name: NameHandle) {}
        fn release_credential(&self, _credential: CredHandle) {}
        fn delete_context(&self, _context: CtxHandle) {}
    }

    #[test]
    fn test_both_sides_joined() {
        let provider = ChainedMessages::new(&[
            (1, StatusKind::Gss, &["Unspecified GSS failure"]),
            (2529638919, StatusKind::Mech, &["Ticket expired", "Renewal refused"]),
        ]);

        let rendered = extract_status_messages(
            &provider,
            GssStatus {
                major: 1,
                minor: 2529638919,
            },
            Some("1.2.840.113554.1.2.2"),
        );

        assert_eq!(
            rendered,
            "Majors: Unspecified GSS failure; Minors: Ticket expired, Renewal refused"
        );
    }

    #[test]
    fn test_major_side_only() {
        let provider = ChainedMessages::new(&[(7, StatusKind::Gss, &["No credentials cache"])]);

        let rendered =
            extract_status_messages(&provider, GssStatus { major: 7, minor: 0 }, None);

        assert_eq!(rendered, "Majors: No credentials cache");
    }

    #[test]
    fn test_minor_side_only() {
        let provider = ChainedMessages::new(&[(11, StatusKind::Mech, &["KDC unreachable"])]);

        let rendered =
            extract_status_messages(&provider, GssStatus { major: 0, minor: 11 }, None);

        assert_eq!(rendered, "Minors: KDC unreachable");
    }

    #[test]
    fn test_silent_provider_yields_empty() {
        let provider = ChainedMessages::new(&[]);

        let rendered =
            extract_status_messages(&provider, GssStatus { major: 5, minor: 9 }, None);

        assert!(rendered.is_empty());
    }

    #[test]
    fn test_describe_failure_with_and_without_messages() {
        let provider = ChainedMessages::new(&[(3, StatusKind::Gss, &["Bad name"])]);

        assert_eq!(
            describe_failure(&provider, "importing the principal name", GssStatus { major: 3, minor: 0 }, None),
            "importing the principal name failed: Majors: Bad name"
        );
        assert_eq!(
            describe_failure(&provider, "acquiring credentials", GssStatus { major: 99, minor: 0 }, None),
            "acquiring credentials failed"
        );
    }
}
