//! The identity-provider seam.

use async_trait::async_trait;
use tokio::sync::watch;

use super::{AuthFault, Credentials, Session};

/// Account authentication and session observation.
///
/// Each provider keeps the current session in a watch channel;
/// [`subscribe`](Self::subscribe) hands out receivers and dropping a
/// receiver unsubscribes it.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthFault>;

    async fn sign_up(&self, credentials: &Credentials) -> Result<Session, AuthFault>;

    async fn sign_out(&self) -> Result<(), AuthFault>;

    /// Observe session changes. The receiver's current value is the session
    /// at the time of subscribing.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn IdentityProvider) {}
};
