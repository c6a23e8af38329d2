use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::principal::Principal;
use crate::Result;

mod memory;
pub use self::memory::MemoryIdentity;

/// Callback invoked with the new principal, or `None` after sign out.
pub type AuthStateListener = Box<dyn Fn(Option<Principal>) + Send + Sync>;

/// External identity service the session provider subscribes to.
pub trait IdentityService {
    /// Register a listener for auth state changes. The listener stays
    /// registered until the returned [`Subscription`] is dropped.
    fn on_auth_state_changed(&self, listener: AuthStateListener) -> Subscription;
}

/// Sign in flows the login, register and forgot-password views drive.
#[async_trait]
pub trait AuthFlow {
    async fn sign_in_with_email_and_password(&self, email: &str, password: &str)
        -> Result<Principal>;
    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
    ) -> Result<Principal>;
    async fn send_password_reset_email(&self, email: &str) -> Result<()>;
    async fn sign_out(&self) -> Result<()>;
}

/// Handle for a registered auth state listener.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidEmail { email: String },
    UserNotFound { email: String },
    InvalidCredential,
    EmailAlreadyInUse { email: String },
    WeakPassword { min_chars: usize },
}

impl AuthError {
    /// Error code in the identity service's `auth/...` namespace.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidEmail { .. } => "auth/invalid-email",
            AuthError::UserNotFound { .. } => "auth/user-not-found",
            AuthError::InvalidCredential => "auth/invalid-credential",
            AuthError::EmailAlreadyInUse { .. } => "auth/email-already-in-use",
            AuthError::WeakPassword { .. } => "auth/weak-password",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::InvalidEmail { email } => write!(f, "{}: {}", self.code(), email),
            AuthError::UserNotFound { email } => write!(f, "{}: {}", self.code(), email),
            AuthError::InvalidCredential => write!(f, "{}", self.code()),
            AuthError::EmailAlreadyInUse { email } => write!(f, "{}: {}", self.code(), email),
            AuthError::WeakPassword { min_chars } => write!(
                f,
                "{}: password should be at least {} characters",
                self.code(),
                min_chars
            ),
        }
    }
}

impl std::error::Error for AuthError {}

/// Account seeded into [`MemoryIdentity`] from configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct UserEntry {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}
