use crate::core::gate::{Decision, Guard, NavigationRequest};
use crate::core::route::AccessClass;
use crate::core::session::SessionState;

/// Enforces a route's access class against the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGate {
    sign_in_path: String,
    home_path: String,
}

impl AccessGate {
    pub fn new(sign_in_path: impl Into<String>, home_path: impl Into<String>) -> Self {
        Self {
            sign_in_path: sign_in_path.into(),
            home_path: home_path.into(),
        }
    }

    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    /// Depends only on the access class and the session state.
    pub fn decide(&self, access: AccessClass, session: &SessionState) -> Decision {
        match (access, session) {
            (AccessClass::Unrestricted, _) => Decision::Allow,
            (AccessClass::RequiresAuthenticated, SessionState::Unknown)
            | (AccessClass::RequiresAnonymous, SessionState::Unknown) => Decision::Defer,
            (AccessClass::RequiresAuthenticated, SessionState::SignedOut) => {
                Decision::Redirect(self.sign_in_path.clone())
            }
            (AccessClass::RequiresAuthenticated, SessionState::SignedIn(_)) => Decision::Allow,
            (AccessClass::RequiresAnonymous, SessionState::SignedIn(_)) => {
                Decision::Redirect(self.home_path.clone())
            }
            (AccessClass::RequiresAnonymous, SessionState::SignedOut) => Decision::Allow,
        }
    }
}

impl Guard for AccessGate {
    fn check(&self, request: &NavigationRequest<'_>, session: &SessionState) -> Decision {
        self.decide(request.access, session)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::principal::Principal;

    const ALL_ACCESS: [AccessClass; 3] = [
        AccessClass::RequiresAuthenticated,
        AccessClass::RequiresAnonymous,
        AccessClass::Unrestricted,
    ];

    fn states() -> Vec<SessionState> {
        vec![
            SessionState::Unknown,
            SessionState::SignedOut,
            SessionState::SignedIn(Arc::new(Principal::new("uid-1"))),
        ]
    }

    fn gate() -> AccessGate {
        AccessGate::new("/login", "/")
    }

    #[test]
    fn authenticated_routes_send_signed_out_users_to_sign_in() {
        assert_eq!(
            gate().decide(AccessClass::RequiresAuthenticated, &SessionState::SignedOut),
            Decision::Redirect("/login".into())
        );
    }

    #[test]
    fn anonymous_routes_send_signed_in_users_home() {
        let session = SessionState::SignedIn(Arc::new(Principal::new("uid-1")));
        assert_eq!(
            gate().decide(AccessClass::RequiresAnonymous, &session),
            Decision::Redirect("/".into())
        );
    }

    #[test]
    fn unrestricted_always_allows() {
        for state in states() {
            assert_eq!(gate().decide(AccessClass::Unrestricted, &state), Decision::Allow);
        }
    }

    #[test]
    fn gated_routes_defer_while_unknown() {
        for access in [AccessClass::RequiresAuthenticated, AccessClass::RequiresAnonymous] {
            assert_eq!(gate().decide(access, &SessionState::Unknown), Decision::Defer);
        }
    }

    #[test]
    fn matching_session_allows() {
        let signed_in = SessionState::SignedIn(Arc::new(Principal::new("uid-1")));
        assert_eq!(
            gate().decide(AccessClass::RequiresAuthenticated, &signed_in),
            Decision::Allow
        );
        assert_eq!(
            gate().decide(AccessClass::RequiresAnonymous, &SessionState::SignedOut),
            Decision::Allow
        );
    }

    #[test]
    fn decisions_are_repeatable() {
        let gate = gate();
        for access in ALL_ACCESS {
            for state in states() {
                assert_eq!(gate.decide(access, &state), gate.decide(access, &state));
            }
        }
    }
}
