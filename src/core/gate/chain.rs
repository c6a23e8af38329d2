use crate::core::gate::{AccessGate, Decision, Guard, Logger, NavigationRequest};
use crate::core::session::SessionState;

pub struct GuardChain {
    root: Logger<AccessGate>,
}

impl GuardChain {
    pub fn new(gate: AccessGate) -> Self {
        let logger = Logger::new(gate);

        Self { root: logger }
    }

    pub fn gate(&self) -> &AccessGate {
        self.root.inner()
    }

    pub fn check(&self, request: &NavigationRequest<'_>, session: &SessionState) -> Decision {
        self.root.check(request, session)
    }
}
