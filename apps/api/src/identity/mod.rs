//! Identity provider boundary: sign-up, sign-in, sign-out and an auth-state
//! subscription. The rest of the service only consumes the resulting
//! `Identity`.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::user::Identity;

pub mod handlers;
pub mod local;

pub use local::LocalIdentityProvider;

/// Messages are user-facing and surfaced verbatim.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password should be at least 6 characters")]
    WeakPassword,

    #[error("Email already in use")]
    EmailInUse,

    #[error("Invalid email or password")]
    InvalidCredentials,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthStateChange {
    SignedIn(Identity),
    SignedOut(Uuid),
}

/// Carried in `AppState` as `Arc<dyn IdentityProvider>`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Identity, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self, user_id: Uuid);

    /// Yields every auth-state change from the moment of subscription.
    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange>;
}
