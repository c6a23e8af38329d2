//! Session provider.
//!
//! Holds the last principal reported by the identity service. The provider is
//! the single producer: it subscribes once and every auth state notification
//! overwrites the snapshot. Readers get a [`SessionHandle`] whose `current`
//! accessor never waits on the identity service.
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::watch;

use crate::common::{debug, info, ErrorKind, Result, Time};
use crate::core::identity::{IdentityService, Subscription};
use crate::core::principal::Principal;

/// Whether a principal is present, absent, or not yet reported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    // No auth state notification delivered yet.
    #[default]
    Unknown,
    SignedOut,
    SignedIn(Arc<Principal>),
}

impl SessionState {
    pub fn from_notification(principal: Option<Principal>) -> Self {
        match principal {
            Some(principal) => SessionState::SignedIn(Arc::new(principal)),
            None => SessionState::SignedOut,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SessionState::Unknown)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::SignedIn(_))
    }

    pub fn principal(&self) -> Option<&Arc<Principal>> {
        match self {
            SessionState::SignedIn(principal) => Some(principal),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionState::Unknown => f.write_str("unknown"),
            SessionState::SignedOut => f.write_str("signed out"),
            SessionState::SignedIn(principal) => write!(f, "signed in as {}", principal),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub state: SessionState,
    // Number of notifications delivered so far.
    pub version: u64,
    pub delivered_at: Option<Time>,
}

pub struct SessionProvider {
    sender: Arc<watch::Sender<Snapshot>>,
    subscription: Mutex<Option<Subscription>>,
}

impl SessionProvider {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Snapshot::default());
        Self {
            sender: Arc::new(sender),
            subscription: Mutex::new(None),
        }
    }

    /// Subscribe to the identity service. Only one subscription is allowed
    /// for the lifetime of the provider.
    pub fn attach(&self, service: &dyn IdentityService) -> crate::Result<()> {
        Ok(self.attach_inner(service)?)
    }

    fn attach_inner(&self, service: &dyn IdentityService) -> Result<()> {
        let mut subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if subscription.is_some() {
            return Err(ErrorKind::AlreadySubscribed.into());
        }

        let sender = Arc::clone(&self.sender);
        *subscription = Some(service.on_auth_state_changed(Box::new(move |principal| {
            let state = SessionState::from_notification(principal);
            info!(session=%state, "Auth state changed");
            sender.send_modify(|snapshot| {
                snapshot.state = state;
                snapshot.version += 1;
                snapshot.delivered_at = Some(Utc::now());
            });
        })));
        debug!("Session provider subscribed");

        Ok(())
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Default for SessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of the session. Cheap to clone and inject.
#[derive(Clone)]
pub struct SessionHandle {
    receiver: watch::Receiver<Snapshot>,
}

impl SessionHandle {
    pub fn current(&self) -> SessionState {
        self.receiver.borrow().state.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }

    pub fn current_principal(&self) -> Option<Arc<Principal>> {
        self.receiver.borrow().state.principal().cloned()
    }

    /// Wait for the next notification.
    pub async fn changed(&mut self) -> crate::Result<SessionState> {
        self.receiver
            .changed()
            .await
            .map_err(|_| closed())?;
        Ok(self.receiver.borrow_and_update().state.clone())
    }

    /// Wait until the first notification has been delivered.
    pub async fn ready(&mut self) -> crate::Result<SessionState> {
        let snapshot = self
            .receiver
            .wait_for(|snapshot| snapshot.state.is_known())
            .await
            .map_err(|_| closed())?;
        Ok(snapshot.state.clone())
    }

    /// Log every session transition until the provider goes away.
    pub async fn log_changes(mut self) {
        while let Ok(state) = self.changed().await {
            let version = self.receiver.borrow().version;
            info!(session=%state, version, "Session updated");
        }
        debug!("Session provider dropped");
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("state", &self.current())
            .finish()
    }
}

fn closed() -> crate::RouteGateError {
    crate::common::Error::from(ErrorKind::Internal("session provider dropped".to_owned())).into()
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_pending, assert_ready, task};

    use super::*;
    use crate::core::identity::MemoryIdentity;

    fn alice() -> Principal {
        Principal::new("uid-alice").with_email("alice@example.com")
    }

    #[test]
    fn starts_unknown_until_first_notification() {
        let identity = MemoryIdentity::new();
        let provider = SessionProvider::new();
        provider.attach(&identity).unwrap();

        let handle = provider.handle();
        assert_eq!(handle.current(), SessionState::Unknown);

        identity.initialize();
        assert_eq!(handle.current(), SessionState::SignedOut);
        assert_eq!(handle.snapshot().version, 1);
    }

    #[test]
    fn notifications_overwrite_snapshot() {
        let identity = MemoryIdentity::initialized();
        let provider = SessionProvider::new();
        provider.attach(&identity).unwrap();
        let handle = provider.handle();

        identity.notify(Some(alice()));
        assert_eq!(
            handle.current_principal().as_deref().map(Principal::uid),
            Some("uid-alice")
        );

        identity.notify(None);
        assert_eq!(handle.current(), SessionState::SignedOut);
        assert!(handle.current_principal().is_none());
    }

    #[test]
    fn attach_only_once() {
        let identity = MemoryIdentity::new();
        let provider = SessionProvider::new();
        provider.attach(&identity).unwrap();
        assert!(provider.is_attached());
        assert!(provider.attach(&identity).is_err());
    }

    #[test]
    fn ready_waits_for_first_notification() {
        let identity = MemoryIdentity::new();
        let provider = SessionProvider::new();
        provider.attach(&identity).unwrap();
        let mut handle = provider.handle();

        {
            let mut waiter = task::spawn(handle.ready());
            assert_pending!(waiter.poll());

            // Held back by the identity service until it has initialised.
            identity.notify(Some(alice()));
            assert_pending!(waiter.poll());

            identity.initialize();
            assert!(waiter.is_woken());
            let state = assert_ready!(waiter.poll()).unwrap();
            assert_eq!(state.principal().map(|p| p.uid()), Some("uid-alice"));
        }

        let mut changed = task::spawn(handle.changed());
        assert_pending!(changed.poll());
        identity.notify(None);
        assert!(changed.is_woken());
        assert_eq!(assert_ready!(changed.poll()).unwrap(), SessionState::SignedOut);
    }

    #[test]
    fn never_notified_stays_unknown() {
        let provider = SessionProvider::new();
        let handle = provider.handle();
        assert!(!handle.current().is_known());
        assert!(handle.snapshot().delivered_at.is_none());
    }
}
