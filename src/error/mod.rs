pub(crate) mod internal;

use std::fmt;
use std::io;

use crate::core::identity::AuthError;

#[derive(Debug)]
pub enum RouteGateError {
    // A route pattern could not be parsed.
    InvalidPattern { pattern: String, reason: String },
    // The route table violates one of its construction rules.
    InvalidRouteTable { description: String },
    // Following redirects did not settle on a view.
    RedirectLoop { path: String, hops: usize },
    NoRoute { path: String },
    // Rejected by the identity service.
    Auth(AuthError),
    Config { description: String },
    Io(io::Error),
    Internal { description: String },
}

impl fmt::Display for RouteGateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RouteGateError::InvalidPattern { pattern, reason } => {
                write!(f, "invalid path pattern {}: {}", pattern, reason)
            }
            RouteGateError::InvalidRouteTable { description } => {
                write!(f, "invalid route table. {}", description)
            }
            RouteGateError::RedirectLoop { path, hops } => {
                write!(f, "redirect loop navigating to {} after {} hops", path, hops)
            }
            RouteGateError::NoRoute { path } => write!(f, "no route matches {}", path),
            RouteGateError::Auth(err) => write!(f, "{}", err),
            RouteGateError::Config { description } => write!(f, "config error. {}", description),
            RouteGateError::Io(err) => err.fmt(f),
            RouteGateError::Internal { description } => write!(f, "{}", description),
        }
    }
}

impl std::error::Error for RouteGateError {}

impl From<AuthError> for RouteGateError {
    fn from(err: AuthError) -> Self {
        RouteGateError::Auth(err)
    }
}

impl From<io::Error> for RouteGateError {
    fn from(err: io::Error) -> Self {
        RouteGateError::Io(err)
    }
}

impl From<internal::Error> for RouteGateError {
    fn from(err: internal::Error) -> Self {
        use internal::ErrorKind;

        if let Some(backtrace) = err.backtrace() {
            tracing::trace!("{:?}", backtrace);
        }

        match err.into_kind() {
            ErrorKind::Io(err) => RouteGateError::Io(err),
            ErrorKind::Yaml(err) => RouteGateError::Config {
                description: err.to_string(),
            },
            ErrorKind::InvalidConfig(description) => RouteGateError::Config { description },
            ErrorKind::UnknownPreset(name) => RouteGateError::Config {
                description: format!("unknown app preset {}", name),
            },
            ErrorKind::InvalidPattern { pattern, reason } => {
                RouteGateError::InvalidPattern { pattern, reason }
            }
            kind @ (ErrorKind::MissingFallback
            | ErrorKind::UnreachableRoute { .. }
            | ErrorKind::DuplicateRoute { .. }) => RouteGateError::InvalidRouteTable {
                description: internal::Error::from(kind).to_string(),
            },
            ErrorKind::NoRoute { path } => RouteGateError::NoRoute { path },
            ErrorKind::RedirectLoop { path, hops } => RouteGateError::RedirectLoop { path, hops },
            kind @ (ErrorKind::AlreadySubscribed | ErrorKind::Internal(_)) => {
                RouteGateError::Internal {
                    description: internal::Error::from(kind).to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;

    #[test]
    fn internal_route_table_errors_are_public_invalid_route_table() {
        let err = RouteGateError::from(crate::common::Error::from(ErrorKind::MissingFallback));
        match err {
            RouteGateError::InvalidRouteTable { description } => {
                assert_eq!(description, "route table has no wildcard fallback")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn redirect_loop_keeps_path() {
        let err = RouteGateError::from(crate::common::Error::from(ErrorKind::RedirectLoop {
            path: "/a".into(),
            hops: 11,
        }));
        assert!(matches!(err, RouteGateError::RedirectLoop { ref path, hops: 11 } if path == "/a"));
    }
}
