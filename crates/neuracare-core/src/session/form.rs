//! Sign-in / sign-up form state.

use tracing::{info, warn};

use super::provider::IdentityProvider;
use super::{AuthFault, Credentials, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

/// The authentication form. Faults show inline and never touch the
/// request lifecycle.
#[derive(Debug, Default)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    mode: AuthMode,
    error: Option<AuthFault>,
    submitting: bool,
}

impl AuthForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn error(&self) -> Option<AuthFault> {
        self.error
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Switch between sign-in and sign-up; clears any error.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
        self.error = None;
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            AuthMode::SignIn => "Sign in to your account.",
            AuthMode::SignUp => "Create an account to get started.",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.submitting, self.mode) {
            (true, _) => "Processing...",
            (false, AuthMode::SignIn) => "Sign In",
            (false, AuthMode::SignUp) => "Create Account",
        }
    }

    pub fn toggle_label(&self) -> &'static str {
        match self.mode {
            AuthMode::SignIn => "Don't have an account? Sign Up",
            AuthMode::SignUp => "Already have an account? Sign In",
        }
    }

    /// Sign in or sign up, depending on the mode.
    ///
    /// On failure the fault is kept for display and also returned. The
    /// password is cleared on success.
    pub async fn submit(&mut self, provider: &dyn IdentityProvider) -> Result<Session, AuthFault> {
        self.error = None;
        self.submitting = true;

        let credentials = Credentials::new(self.email.clone(), self.password.clone());
        let result = match self.mode {
            AuthMode::SignIn => provider.sign_in(&credentials).await,
            AuthMode::SignUp => provider.sign_up(&credentials).await,
        };
        self.submitting = false;

        match result {
            Ok(session) => {
                info!(uid = %session.uid, mode = ?self.mode, "authenticated");
                self.password.clear();
                Ok(session)
            }
            Err(fault) => {
                warn!(fault = ?fault, mode = ?self.mode, "authentication error");
                self.error = Some(fault);
                Err(fault)
            }
        }
    }
}
