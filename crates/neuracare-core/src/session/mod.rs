//! Sessions, authentication faults, and the session context.
//!
//! The session is not ambient state: an [`IdentityProvider`] publishes it
//! and a [`SessionContext`] owned by the app observes it.
//!
//! ```text
//! SessionContext lifecycle:
//!
//! Uninitialized --observe()--> Observing --first value--> SignedIn(session)
//!       ^                                          \----> SignedOut
//!       +-------------------- unsubscribe() -------------------+
//! ```

pub mod form;
pub mod identity_toolkit;
pub mod provider;

use tokio::sync::watch;
use tracing::{debug, info};

pub use form::{AuthForm, AuthMode};
pub use identity_toolkit::IdentityToolkitProvider;
pub use provider::IdentityProvider;

/// A signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl Session {
    /// Name for the header greeting: first word of the display name, else
    /// the local part of the e-mail address.
    pub fn greeting_name(&self) -> Option<&str> {
        let from_display = self
            .display_name
            .as_deref()
            .and_then(|n| n.split_whitespace().next());
        let from_email = || {
            self.email
                .as_deref()
                .and_then(|e| e.split('@').next())
                .filter(|local| !local.is_empty())
        };
        from_display.or_else(from_email)
    }
}

/// E-mail and password as typed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Why authentication failed. `Display` is the message shown on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFault {
    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("An account with this email already exists. Please sign in.")]
    EmailAlreadyInUse,

    #[error("Password should be at least 6 characters.")]
    WeakPassword,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("An unexpected error occurred. Please try again.")]
    Unknown,
}

impl AuthFault {
    /// Map a provider error code to a fault.
    ///
    /// Accepts both SDK-style codes (`auth/wrong-password`) and REST-style
    /// codes (`INVALID_PASSWORD`, `WEAK_PASSWORD : Password should be ...`).
    pub fn from_code(code: &str) -> Self {
        let code = code.split(" : ").next().unwrap_or(code).trim();
        match code {
            "auth/user-not-found"
            | "auth/wrong-password"
            | "auth/invalid-credential"
            | "EMAIL_NOT_FOUND"
            | "INVALID_PASSWORD"
            | "INVALID_LOGIN_CREDENTIALS" => Self::InvalidCredentials,
            "auth/email-already-in-use" | "EMAIL_EXISTS" => Self::EmailAlreadyInUse,
            "auth/weak-password" | "WEAK_PASSWORD" => Self::WeakPassword,
            "auth/invalid-email" | "INVALID_EMAIL" => Self::InvalidEmail,
            _ => Self::Unknown,
        }
    }
}

/// Where the session context is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Not yet subscribed to a provider.
    Uninitialized,
    /// Subscribed, waiting for the first value.
    Observing,
    SignedIn(Session),
    SignedOut,
}

/// Explicit session value handed to the parts of the app that need it.
#[derive(Debug)]
pub struct SessionContext {
    rx: Option<watch::Receiver<Option<Session>>>,
    state: SessionState,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            rx: None,
            state: SessionState::Uninitialized,
        }
    }

    /// Subscribe to `provider`. The current session is delivered by the
    /// next [`sync`](Self::sync) or [`changed`](Self::changed).
    pub fn observe(&mut self, provider: &dyn IdentityProvider) {
        let mut rx = provider.subscribe();
        rx.mark_changed();
        self.rx = Some(rx);
        self.state = SessionState::Observing;
        debug!("observing session");
    }

    /// Stop observing and forget the session.
    pub fn unsubscribe(&mut self) {
        self.rx = None;
        self.state = SessionState::Uninitialized;
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::SignedIn(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the first session value has arrived.
    pub fn is_resolved(&self) -> bool {
        matches!(
            self.state,
            SessionState::SignedIn(_) | SessionState::SignedOut
        )
    }

    /// Apply a pending session change without waiting. Returns `true` if
    /// the state changed.
    pub fn sync(&mut self) -> bool {
        let Some(rx) = self.rx.as_mut() else {
            return false;
        };
        match rx.has_changed() {
            Ok(true) => {
                let session = rx.borrow_and_update().clone();
                self.apply(session)
            }
            _ => false,
        }
    }

    /// Wait for the next session change and apply it.
    ///
    /// Returns `false` when not observing or when the provider has gone away.
    pub async fn changed(&mut self) -> bool {
        let Some(rx) = self.rx.as_mut() else {
            return false;
        };
        if rx.changed().await.is_err() {
            return false;
        }
        let session = rx.borrow_and_update().clone();
        self.apply(session);
        true
    }

    fn apply(&mut self, session: Option<Session>) -> bool {
        let next = match session {
            Some(s) => SessionState::SignedIn(s),
            None => SessionState::SignedOut,
        };
        if next == self.state {
            return false;
        }
        match &next {
            SessionState::SignedIn(s) => info!(uid = %s.uid, "session started"),
            _ => info!("no active session"),
        }
        self.state = next;
        true
    }
}
