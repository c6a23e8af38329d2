use std::fmt;
use std::str::FromStr;

use crate::common::{ErrorKind, Result};

// Name given to a bare `*` catch-all so it can still be looked up in params.
const DEFAULT_CATCH_ALL: &str = "pathMatch";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

/// A parsed route path such as `/discussion/:id` or `/:pathMatch(.*)*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Parameters captured while matching a path against a pattern, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl PathPattern {
    pub fn parse(raw: impl Into<String>) -> crate::Result<Self> {
        Ok(Self::parse_inner(raw.into())?)
    }

    pub(crate) fn parse_inner(raw: String) -> Result<Self> {
        let invalid = |reason: &str| ErrorKind::InvalidPattern {
            pattern: raw.clone(),
            reason: reason.to_owned(),
        };

        if raw == "*" {
            return Ok(Self {
                segments: vec![Segment::CatchAll(DEFAULT_CATCH_ALL.to_owned())],
                raw,
            });
        }
        let body = raw
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;
        if body.starts_with('/') {
            return Err(invalid("empty segment").into());
        }
        let body = body.strip_suffix('/').unwrap_or(body);

        let mut segments = Vec::new();
        if !body.is_empty() {
            for part in body.split('/') {
                segments.push(Self::parse_segment(part).map_err(|reason| invalid(reason))?);
            }
        }

        let mut names: Vec<&str> = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            match segment {
                Segment::Static(_) => {}
                Segment::CatchAll(_) if i + 1 != segments.len() => {
                    return Err(invalid("catch-all must be the last segment").into());
                }
                Segment::Param(name) | Segment::CatchAll(name) => {
                    if names.contains(&name.as_str()) {
                        return Err(invalid("duplicate parameter name").into());
                    }
                    names.push(name);
                }
            }
        }

        Ok(Self { raw, segments })
    }

    fn parse_segment(part: &str) -> std::result::Result<Segment, &'static str> {
        if part.is_empty() {
            return Err("empty segment");
        }
        if part == "*" {
            return Ok(Segment::CatchAll(DEFAULT_CATCH_ALL.to_owned()));
        }
        let Some(param) = part.strip_prefix(':') else {
            return Ok(Segment::Static(part.to_owned()));
        };

        let (name, rest) = match param.find('(') {
            Some(open) => (&param[..open], &param[open..]),
            None => (param, ""),
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err("invalid parameter name");
        }
        match rest {
            "" => Ok(Segment::Param(name.to_owned())),
            "(.*)" | "(.*)*" | "(.*)+" => Ok(Segment::CatchAll(name.to_owned())),
            _ => Err("custom parameter expressions are not supported"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::CatchAll(_)))
    }

    /// Match a request path. Query string and fragment are ignored, one
    /// trailing slash is tolerated and static segments compare ignoring ASCII case.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let path = normalize(path);
        let mut parts: Vec<&str> = if path == "/" {
            Vec::new()
        } else {
            path[1..].split('/').collect()
        };
        if parts.last() == Some(&"") {
            parts.pop();
        }

        let mut params = Vec::new();
        let mut parts_iter = parts.iter().enumerate();
        for segment in &self.segments {
            match segment {
                Segment::CatchAll(name) => {
                    let rest = match parts_iter.next() {
                        Some((i, _)) => parts[i..].join("/"),
                        None => String::new(),
                    };
                    params.push((name.clone(), rest));
                    return Some(Params(params));
                }
                Segment::Static(expected) => {
                    let (_, part) = parts_iter.next()?;
                    if !part.eq_ignore_ascii_case(expected) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let (_, part) = parts_iter.next()?;
                    if part.is_empty() {
                        return None;
                    }
                    params.push((name.clone(), (*part).to_owned()));
                }
            }
        }

        match parts_iter.next() {
            Some(_) => None,
            None => Some(Params(params)),
        }
    }
}

// Strip query and fragment and make sure the path is absolute.
pub(crate) fn normalize(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{}", path)
    }
}

impl FromStr for PathPattern {
    type Err = crate::RouteGateError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PathPattern::parse(s)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(s: &str) -> PathPattern {
        PathPattern::parse(s).unwrap()
    }

    #[test]
    fn static_paths() {
        let p = pattern("/profile");
        assert!(p.matches("/profile").is_some());
        assert!(p.matches("/profile/").is_some());
        assert!(p.matches("/Profile").is_some());
        assert!(p.matches("/profile?tab=posts#top").is_some());
        assert!(p.matches("/profile/edit").is_none());
        assert!(p.matches("/").is_none());
    }

    #[test]
    fn root() {
        let p = pattern("/");
        assert!(p.matches("/").is_some());
        assert!(p.matches("").is_some());
        assert!(p.matches("/?q=1").is_some());
        assert!(p.matches("/login").is_none());
    }

    #[test]
    fn named_params() {
        let p = pattern("/discussion/:id");
        let params = p.matches("/discussion/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert!(p.matches("/discussion").is_none());
        assert!(p.matches("/discussion/").is_none());
        assert!(p.matches("/discussion/42/comments").is_none());
    }

    #[test]
    fn catch_all() {
        let p = pattern("/:pathMatch(.*)*");
        assert!(p.is_catch_all());
        assert_eq!(p.matches("/").unwrap().get("pathMatch"), Some(""));
        assert_eq!(
            p.matches("/does/not/exist").unwrap().get("pathMatch"),
            Some("does/not/exist")
        );

        let star = pattern("*");
        assert!(star.is_catch_all());
        assert!(star.matches("/anything").is_some());
    }

    #[test]
    fn rejects_invalid_patterns() {
        for raw in [
            "login",
            "//",
            "///",
            "/a//b",
            "/a//",
            "/:",
            "/*/tail",
            "/:id/:id",
            "/:id(\\d+)",
        ] {
            assert!(PathPattern::parse(raw).is_err(), "{} should be rejected", raw);
        }
    }
}
