use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::identity::{AuthError, AuthStateChange, IdentityProvider};
use crate::models::user::Identity;

const MIN_PASSWORD_LEN: usize = 6;
const EVENT_CAPACITY: usize = 64;

struct Account {
    password: String,
    identity: Identity,
}

/// In-process account registry keyed by lower-cased email.
/// Accounts live for the lifetime of the process.
pub struct LocalIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    events: broadcast::Sender<AuthStateChange>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            accounts: RwLock::new(HashMap::new()),
            events,
        }
    }

    fn publish(&self, change: AuthStateChange) {
        // No subscribers is fine: nobody is waiting on auth state yet.
        let _ = self.events.send(change);
    }
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AuthError::InvalidEmail),
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Identity, AuthError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&email) {
            return Err(AuthError::EmailInUse);
        }

        let display_name = display_name.trim();
        let identity = Identity {
            user_id: Uuid::new_v4(),
            email: email.clone(),
            display_name: (!display_name.is_empty()).then(|| display_name.to_string()),
        };
        accounts.insert(
            email,
            Account {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );
        drop(accounts);

        info!(user_id = %identity.user_id, "Account created");
        self.publish(AuthStateChange::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;
        let identity = {
            let accounts = self.accounts.read().await;
            match accounts.get(&email) {
                Some(account) if account.password == password => account.identity.clone(),
                _ => return Err(AuthError::InvalidCredentials),
            }
        };

        info!(user_id = %identity.user_id, "Signed in");
        self.publish(AuthStateChange::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self, user_id: Uuid) {
        info!(user_id = %user_id, "Signed out");
        self.publish(AuthStateChange::SignedOut(user_id));
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let provider = LocalIdentityProvider::new();
        let created = provider
            .sign_up("Recruiter@Example.com", "hunter22", "Rae Cruiter")
            .await
            .unwrap();
        assert_eq!(created.email, "recruiter@example.com");
        assert_eq!(created.display_name.as_deref(), Some("Rae Cruiter"));

        let signed_in = provider
            .sign_in("recruiter@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(signed_in, created);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let provider = LocalIdentityProvider::new();
        provider.sign_up("a@b.io", "secret1", "").await.unwrap();
        let err = provider.sign_up("A@B.io", "secret2", "").await.unwrap_err();
        assert_eq!(err, AuthError::EmailInUse);
    }

    #[tokio::test]
    async fn test_weak_password_and_bad_email() {
        let provider = LocalIdentityProvider::new();
        assert_eq!(
            provider.sign_up("a@b.io", "123", "").await.unwrap_err(),
            AuthError::WeakPassword
        );
        assert_eq!(
            provider.sign_up("not-an-email", "secret1", "").await.unwrap_err(),
            AuthError::InvalidEmail
        );
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let provider = LocalIdentityProvider::new();
        provider.sign_up("a@b.io", "secret1", "").await.unwrap();
        assert_eq!(
            provider.sign_in("a@b.io", "secret2").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            provider.sign_in("nobody@b.io", "secret1").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn test_subscription_sees_sign_in_and_sign_out() {
        let provider = LocalIdentityProvider::new();
        let mut events = provider.subscribe();

        let identity = provider.sign_up("a@b.io", "secret1", "A").await.unwrap();
        provider.sign_out(identity.user_id).await;

        assert_eq!(
            events.recv().await.unwrap(),
            AuthStateChange::SignedIn(identity.clone())
        );
        assert_eq!(
            events.recv().await.unwrap(),
            AuthStateChange::SignedOut(identity.user_id)
        );
    }
}
