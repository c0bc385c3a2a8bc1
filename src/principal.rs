//! Kerberos principal name decomposition.
//!
//! A principal has the textual form `name[/instance]*[@realm]`. Parsing is
//! total: any input string, including the empty one, yields a result.

/// Structured parts of a principal name.
///
/// # Example
///
/// ```
/// use gss_negotiate::PrincipalName;
///
/// let principal = PrincipalName::parse("alice/admin@EXAMPLE.COM");
/// assert_eq!(principal.name, "alice");
/// assert_eq!(principal.instances, vec!["admin".to_string()]);
/// assert_eq!(principal.realm, "EXAMPLE.COM");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrincipalName {
    /// Primary name component.
    pub name: String,

    /// Instance components, in order of appearance.
    pub instances: Vec<String>,

    /// Administrative domain; empty when the input carries no `@`.
    pub realm: String,
}

impl PrincipalName {
    /// Decompose a raw identity string.
    ///
    /// Everything after the last `@` is the realm; the remaining body is
    /// split on `/`, the first segment becoming the name and the rest the
    /// instances.
    pub fn parse(principal: &str) -> Self {
        let (body, realm) = match principal.rfind('@') {
            Some(at) => (&principal[..at], principal[at + 1..].to_string()),
            None => (principal, String::new()),
        };

        let mut segments = body.split('/');
        let name = segments.next().unwrap_or_default().to_string();
        let instances = segments.map(str::to_string).collect();

        Self {
            name,
            instances,
            realm,
        }
    }
}
