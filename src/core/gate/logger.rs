use crate::common::debug;
use crate::core::gate::{Decision, Guard, NavigationRequest};
use crate::core::session::SessionState;

pub struct Logger<G> {
    next: G,
}

impl<G> Logger<G> {
    pub fn new(next: G) -> Self {
        Self { next }
    }

    pub fn inner(&self) -> &G {
        &self.next
    }
}

impl<G> Guard for Logger<G>
where
    G: Guard,
{
    fn check(&self, request: &NavigationRequest<'_>, session: &SessionState) -> Decision {
        let decision = self.next.check(request, session);

        debug!(
            path=%request.path,
            view=%request.view,
            access=%request.access,
            session=%session,
            ?decision,
            "Gate decided"
        );

        decision
    }
}
