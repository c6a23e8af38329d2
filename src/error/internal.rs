use std::error;
use std::fmt;
use std::io;

use backtrace::Backtrace;

#[derive(Debug)]
pub(crate) struct Error {
    kind: ErrorKind,
    backtrace: Option<Backtrace>,
}

#[derive(Debug)]
pub(crate) enum ErrorKind {
    Io(io::Error),
    Yaml(serde_yaml::Error),
    InvalidPattern { pattern: String, reason: String },
    MissingFallback,
    UnreachableRoute { pattern: String },
    DuplicateRoute { pattern: String },
    NoRoute { path: String },
    RedirectLoop { path: String, hops: usize },
    AlreadySubscribed,
    UnknownPreset(String),
    InvalidConfig(String),
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind() {
            ErrorKind::Io(err) => err.fmt(f),
            ErrorKind::Yaml(err) => write!(f, "yaml error. {}", err),
            ErrorKind::InvalidPattern { pattern, reason } => {
                write!(f, "invalid path pattern {}: {}", pattern, reason)
            }
            ErrorKind::MissingFallback => write!(f, "route table has no wildcard fallback"),
            ErrorKind::UnreachableRoute { pattern } => {
                write!(f, "route {} is shadowed by the wildcard fallback", pattern)
            }
            ErrorKind::DuplicateRoute { pattern } => {
                write!(f, "route {} registered more than once", pattern)
            }
            ErrorKind::NoRoute { path } => write!(f, "no route matches {}", path),
            ErrorKind::RedirectLoop { path, hops } => {
                write!(f, "redirect loop navigating to {} ({} hops)", path, hops)
            }
            ErrorKind::AlreadySubscribed => {
                write!(f, "session provider already subscribed to identity service")
            }
            ErrorKind::UnknownPreset(name) => write!(f, "unknown app preset {}", name),
            ErrorKind::InvalidConfig(description) => {
                write!(f, "invalid configuration. {}", description)
            }
            ErrorKind::Internal(description) => write!(f, "internal error. {}", description),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::from(ErrorKind::Io(err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::from(ErrorKind::Yaml(err))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::with_backtrace(kind)
    }
}

impl Error {
    pub(crate) fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub(crate) fn into_kind(self) -> ErrorKind {
        self.kind
    }

    pub(crate) fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_ref()
    }

    fn with_backtrace(kind: ErrorKind) -> Self {
        Self {
            kind,
            backtrace: Some(Backtrace::new()),
        }
    }
}

impl error::Error for Error {}
