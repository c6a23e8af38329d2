mod guard;
pub use self::guard::{Guard, NavigationRequest};

mod access;
pub use self::access::AccessGate;

mod logger;
pub use self::logger::Logger;

mod chain;
pub use self::chain::GuardChain;

use serde::Serialize;

/// Outcome of consulting the gate before a navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "to", rename_all = "kebab-case")]
pub enum Decision {
    Allow,
    Redirect(String),
    // The session has not been reported yet, hold the navigation.
    Defer,
}
