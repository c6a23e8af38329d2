use crate::core::route::{AccessClass, ViewId};
use crate::core::session::SessionState;
use crate::core::gate::Decision;

/// Navigation about to mount `view`.
#[derive(Debug, Clone, Copy)]
pub struct NavigationRequest<'a> {
    pub path: &'a str,
    pub view: &'a ViewId,
    pub access: AccessClass,
}

pub trait Guard {
    fn check(&self, request: &NavigationRequest<'_>, session: &SessionState) -> Decision;
}
