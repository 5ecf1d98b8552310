// Operator session
//
// Holds the bearer credential for the lifetime of one operator session.
// Two slots mirror the two places a credential can come from: the
// session-scoped store (restored at startup, written after the first
// accepted call) and the live input the operator is typing into.

use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// Process-wide session state, shared as `Arc<Session>`.
///
/// Mutated only by the login path ([`set_input`](Self::set_input),
/// [`persist_input`](Self::persist_input)) and the transport's 401
/// handler ([`clear`](Self::clear)). Read by every outgoing request.
#[derive(Debug, Default)]
pub struct Session {
    stored: RwLock<Option<SecretString>>,
    input: RwLock<Option<SecretString>>,
}

impl Session {
    /// An empty session: nothing stored, nothing typed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session from a credential found in session-scoped storage.
    pub fn restore(stored: SecretString) -> Self {
        Self {
            stored: RwLock::new(Some(stored)),
            input: RwLock::new(None),
        }
    }

    /// The credential to present: the stored one if present, else the
    /// live input. No side effects.
    pub fn credential(&self) -> Option<SecretString> {
        let stored = self.stored.read().expect("session lock poisoned");
        if let Some(secret) = stored.as_ref() {
            return Some(secret.clone());
        }
        drop(stored);
        self.input.read().expect("session lock poisoned").clone()
    }

    /// Replace the live input value.
    ///
    /// Empty input is treated as absent.
    pub fn set_input(&self, secret: SecretString) {
        let value = if secret.expose_secret().is_empty() {
            None
        } else {
            Some(secret)
        };
        *self.input.write().expect("session lock poisoned") = value;
    }

    /// Copy the live input into session storage, if there is any input.
    ///
    /// Called once an authenticated call has been accepted, so a rejected
    /// password never lands in storage.
    pub fn persist_input(&self) {
        let input = self.input.read().expect("session lock poisoned").clone();
        if let Some(secret) = input {
            debug!("storing credential for this session");
            *self.stored.write().expect("session lock poisoned") = Some(secret);
        }
    }

    /// Drop the stored credential. The live input is left alone.
    pub fn clear(&self) {
        debug!("clearing stored credential");
        *self.stored.write().expect("session lock poisoned") = None;
    }

    /// Whether a credential is held in session storage.
    pub fn is_authenticated(&self) -> bool {
        self.stored.read().expect("session lock poisoned").is_some()
    }

    /// Forget everything, stored and typed.
    pub fn reset(&self) {
        self.clear();
        *self.input.write().expect("session lock poisoned") = None;
    }
}
