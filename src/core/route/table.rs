use std::fmt;
use std::ops::Deref;

use serde::Serialize;

use crate::common::{ErrorKind, Result};
use crate::core::route::{AccessClass, Params, PathPattern};

/// Identifier of the view mounted when a route is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ViewId(String);

impl ViewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Deref for ViewId {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    View(ViewId),
    // Navigating here continues at the given path.
    Redirect(String),
}

/// One immutable entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pattern: PathPattern,
    target: RouteTarget,
    access: AccessClass,
    name: Option<String>,
}

impl RouteDescriptor {
    pub fn view(
        pattern: &str,
        view: impl Into<String>,
        access: AccessClass,
    ) -> crate::Result<Self> {
        Ok(Self {
            pattern: PathPattern::parse(pattern)?,
            target: RouteTarget::View(ViewId::new(view)),
            access,
            name: None,
        })
    }

    pub fn redirect(pattern: &str, to: impl Into<String>) -> crate::Result<Self> {
        let to = to.into();
        if !to.starts_with('/') {
            return Err(crate::RouteGateError::InvalidPattern {
                pattern: to,
                reason: "redirect target must start with '/'".into(),
            });
        }
        Ok(Self {
            pattern: PathPattern::parse(pattern)?,
            target: RouteTarget::Redirect(to),
            access: AccessClass::Unrestricted,
            name: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn target(&self) -> &RouteTarget {
        &self.target
    }

    pub fn access(&self) -> AccessClass {
        self.access
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.target {
            RouteTarget::View(view) => write!(f, "{} -> {} [{}]", self.pattern, view, self.access),
            RouteTarget::Redirect(to) => write!(f, "{} => {}", self.pattern, to),
        }
    }
}

/// Result of resolving a path against the table.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub descriptor: &'a RouteDescriptor,
    pub params: Params,
}

/// Ordered, immutable route list resolved first-match-wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: Vec<RouteDescriptor>,
}

impl RouteTableBuilder {
    pub fn route(mut self, descriptor: RouteDescriptor) -> Self {
        self.routes.push(descriptor);
        self
    }

    pub fn build(self) -> crate::Result<RouteTable> {
        Ok(self.validate()?)
    }

    fn validate(self) -> Result<RouteTable> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.routes.len());
        let mut fallback_seen = false;

        for descriptor in &self.routes {
            let pattern = descriptor.pattern.as_str();
            if fallback_seen {
                return Err(ErrorKind::UnreachableRoute {
                    pattern: pattern.to_owned(),
                }
                .into());
            }
            if seen.contains(&pattern) {
                return Err(ErrorKind::DuplicateRoute {
                    pattern: pattern.to_owned(),
                }
                .into());
            }
            seen.push(pattern);
            // Only a catch-all at the root can absorb every path.
            fallback_seen = descriptor.pattern.matches("/").is_some()
                && descriptor.pattern.is_catch_all();
        }

        if !fallback_seen {
            return Err(ErrorKind::MissingFallback.into());
        }

        Ok(RouteTable {
            routes: self.routes,
        })
    }
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// First descriptor whose pattern matches `path`.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|descriptor| {
            descriptor
                .pattern
                .matches(path)
                .map(|params| RouteMatch { descriptor, params })
        })
    }

    pub fn named(&self, name: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|r| r.name() == Some(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
