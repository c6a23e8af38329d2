use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;

use crate::common::{debug, info, warn};
use crate::core::identity::{
    AuthError, AuthFlow, AuthStateListener, IdentityService, Subscription, UserEntry,
};
use crate::core::principal::Principal;
use crate::Result;

const MIN_PASSWORD_CHARS: usize = 6;

type Listener = Arc<dyn Fn(Option<Principal>) + Send + Sync>;

struct Account {
    uid: String,
    email: String,
    password: String,
    display_name: Option<String>,
    email_verified: bool,
}

impl Account {
    fn principal(&self) -> Principal {
        Principal::new(self.uid.clone())
            .with_email(self.email.clone())
            .with_display_name(self.display_name.clone())
            .verified(self.email_verified)
    }
}

#[derive(Default)]
struct Inner {
    accounts: Vec<Account>,
    current: Option<Principal>,
    // The first notification is held back until the service has initialised.
    initialized: bool,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
    password_resets: Vec<String>,
}

/// In-process identity service.
///
/// Behaves like the hosted identity SDK as far as the session provider can
/// observe: listeners registered after initialisation immediately receive the
/// current user, and every sign in, sign out or token refresh notifies all
/// registered listeners.
#[derive(Clone, Default)]
pub struct MemoryIdentity {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialized() -> Self {
        let identity = Self::new();
        identity.lock().initialized = true;
        identity
    }

    /// Seed accounts. Emails are compared case-insensitively and must be unique.
    pub fn with_users(users: impl IntoIterator<Item = UserEntry>) -> Result<Self> {
        let identity = Self::new();
        {
            let mut inner = identity.lock();
            for user in users {
                let email = user.email.trim().to_lowercase();
                if inner.accounts.iter().any(|account| account.email == email) {
                    return Err(AuthError::EmailAlreadyInUse { email }.into());
                }
                let uid = format!("uid-{}", inner.accounts.len() + 1);
                inner.accounts.push(Account {
                    uid,
                    email,
                    password: user.password,
                    display_name: user.display_name,
                    email_verified: user.email_verified,
                });
            }
        }
        Ok(identity)
    }

    /// Finish initialisation and deliver the current user to every listener.
    pub fn initialize(&self) {
        let current = {
            let mut inner = self.lock();
            if inner.initialized {
                return;
            }
            inner.initialized = true;
            inner.current.clone()
        };
        debug!("Identity service initialized");
        self.notify(current);
    }

    /// Re-deliver the current user, as a token refresh does.
    pub fn refresh_token(&self) {
        let current = self.lock().current.clone();
        if current.is_some() {
            self.notify(current);
        }
    }

    pub fn current_user(&self) -> Option<Principal> {
        self.lock().current.clone()
    }

    pub fn password_reset_requests(&self) -> Vec<String> {
        self.lock().password_resets.clone()
    }

    /// Set the current user and notify listeners once initialised.
    pub(crate) fn notify(&self, principal: Option<Principal>) {
        let listeners = {
            let mut inner = self.lock();
            inner.current = principal.clone();
            if !inner.initialized {
                return;
            }
            inner
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect::<Vec<_>>()
        };
        for listener in listeners {
            listener(principal.clone());
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn unsubscribe(inner: &Weak<Mutex<Inner>>, id: u64) {
        if let Some(inner) = inner.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.listeners.retain(|(listener_id, _)| *listener_id != id);
        }
    }
}

impl IdentityService for MemoryIdentity {
    fn on_auth_state_changed(&self, listener: AuthStateListener) -> Subscription {
        let listener: Listener = Arc::from(listener);
        let (id, initial) = {
            let mut inner = self.lock();
            let id = inner.next_listener_id;
            inner.next_listener_id += 1;
            inner.listeners.push((id, Arc::clone(&listener)));
            (id, inner.initialized.then(|| inner.current.clone()))
        };
        if let Some(current) = initial {
            listener(current);
        }

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || MemoryIdentity::unsubscribe(&inner, id))
    }
}

fn validate_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = matches!(
        email.split_once('@'),
        Some((local, domain)) if !local.is_empty() && domain.contains('.')
    );
    if valid {
        Ok(email)
    } else {
        Err(AuthError::InvalidEmail { email }.into())
    }
}

#[async_trait]
impl AuthFlow for MemoryIdentity {
    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal> {
        let email = validate_email(email)?;
        let principal = {
            let inner = self.lock();
            let account = inner
                .accounts
                .iter()
                .find(|account| account.email == email)
                .ok_or_else(|| AuthError::UserNotFound {
                    email: email.clone(),
                })?;
            if account.password != password {
                warn!(user=%email, "Invalid credential");
                return Err(AuthError::InvalidCredential.into());
            }
            account.principal()
        };

        info!(user=%email, "Signed in");
        self.notify(Some(principal.clone()));
        Ok(principal)
    }

    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
    ) -> Result<Principal> {
        let email = validate_email(email)?;
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::WeakPassword {
                min_chars: MIN_PASSWORD_CHARS,
            }
            .into());
        }

        let principal = {
            let mut inner = self.lock();
            if inner.accounts.iter().any(|account| account.email == email) {
                return Err(AuthError::EmailAlreadyInUse { email }.into());
            }
            let account = Account {
                uid: format!("uid-{}", inner.accounts.len() + 1),
                email: email.clone(),
                password: password.to_owned(),
                display_name,
                email_verified: false,
            };
            let principal = account.principal();
            inner.accounts.push(account);
            principal
        };

        info!(user=%email, uid=%principal.uid(), "Registered");
        self.notify(Some(principal.clone()));
        Ok(principal)
    }

    async fn send_password_reset_email(&self, email: &str) -> Result<()> {
        let email = validate_email(email)?;
        let mut inner = self.lock();
        if !inner.accounts.iter().any(|account| account.email == email) {
            return Err(AuthError::UserNotFound { email }.into());
        }
        info!(user=%email, "Password reset requested");
        inner.password_resets.push(email);
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        info!("Signed out");
        self.notify(None);
        Ok(())
    }
}
