//! Write credentials.
//!
//! The core never inspects a credential beyond its presence; the HTTP layer
//! forwards it verbatim.

use std::fmt;

/// Opaque write token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token, for transport layers only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Source of the current write credential, if any.
pub trait CredentialProvider {
    /// Credential held right now.
    fn credential(&self) -> Option<Credential>;

    /// Whether a credential is held.
    fn is_authorised(&self) -> bool {
        self.credential().is_some()
    }
}

impl CredentialProvider for Option<Credential> {
    fn credential(&self) -> Option<Credential> {
        self.clone()
    }
}

impl<P: CredentialProvider + ?Sized> CredentialProvider for std::rc::Rc<P> {
    fn credential(&self) -> Option<Credential> {
        (**self).credential()
    }
}
