#![allow(clippy::module_inception)]

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;

pub use crate::error::RouteGateError;
pub type Result<T, E = crate::error::RouteGateError> = std::result::Result<T, E>;

pub use crate::core::gate::{AccessGate, Decision};
pub use crate::core::navigator::{Navigation, Navigator, Resolved};
pub use crate::core::principal::Principal;
pub use crate::core::route::{AccessClass, PathPattern, RouteDescriptor, RouteTable, RouteTarget};
pub use crate::core::session::{SessionHandle, SessionProvider, SessionState};

pub(crate) mod common {
    pub(crate) type Result<T, E = crate::error::internal::Error> = std::result::Result<T, E>;

    pub(crate) type Error = crate::error::internal::Error;
    pub(crate) type ErrorKind = crate::error::internal::ErrorKind;

    pub use crate::error::RouteGateError;

    pub(crate) type Time = chrono::DateTime<chrono::Utc>;

    pub use tracing::{debug, error, info, trace, warn};
}
