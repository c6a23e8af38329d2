use serde::Serialize;

use crate::common::{debug, trace, ErrorKind, Result};
use crate::core::gate::{AccessGate, Decision, GuardChain, NavigationRequest};
use crate::core::route::{normalize, AccessClass, Params, RouteTable, RouteTarget, ViewId};
use crate::core::session::{SessionHandle, SessionState};

/// Upper bound on redirects followed for a single navigation.
pub const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub requested: String,
    pub resolved: Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum Resolved {
    View {
        view: ViewId,
        path: String,
        params: Params,
        redirected_from: Option<String>,
    },
    // Held until the identity service reports the session.
    Pending { path: String },
}

impl Navigation {
    /// Final path, whether mounted or pending.
    pub fn path(&self) -> &str {
        match &self.resolved {
            Resolved::View { path, .. } | Resolved::Pending { path } => path,
        }
    }

    pub fn view(&self) -> Option<&ViewId> {
        match &self.resolved {
            Resolved::View { view, .. } => Some(view),
            Resolved::Pending { .. } => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.resolved, Resolved::Pending { .. })
    }

    pub fn was_redirected(&self) -> bool {
        matches!(
            self.resolved,
            Resolved::View {
                redirected_from: Some(_),
                ..
            }
        )
    }
}

/// Resolves paths through the route table and the access gate.
pub struct Navigator {
    table: RouteTable,
    guards: GuardChain,
    session: SessionHandle,
}

impl Navigator {
    pub fn new(table: RouteTable, gate: AccessGate, session: SessionHandle) -> crate::Result<Self> {
        Ok(Self::new_inner(table, gate, session)?)
    }

    fn new_inner(table: RouteTable, gate: AccessGate, session: SessionHandle) -> Result<Self> {
        // Redirect targets of the gate itself must mount a view that does not
        // bounce straight back.
        ensure_landing(&table, gate.sign_in_path(), AccessClass::RequiresAuthenticated)?;
        ensure_landing(&table, gate.home_path(), AccessClass::RequiresAnonymous)?;

        Ok(Self {
            table,
            guards: GuardChain::new(gate),
            session,
        })
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn gate(&self) -> &AccessGate {
        self.guards.gate()
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Navigate using the last delivered session snapshot.
    pub fn navigate(&self, path: &str) -> crate::Result<Navigation> {
        let session = self.session.current();
        self.navigate_with(path, &session)
    }

    /// Navigate once the identity service has reported the session.
    pub async fn navigate_when_ready(&self, path: &str) -> crate::Result<Navigation> {
        let mut session = self.session.clone();
        let state = session.ready().await?;
        self.navigate_with(path, &state)
    }

    pub fn navigate_with(&self, path: &str, session: &SessionState) -> crate::Result<Navigation> {
        Ok(self.resolve(path, session)?)
    }

    fn resolve(&self, path: &str, session: &SessionState) -> Result<Navigation> {
        let requested = normalize(path);
        let mut current = requested.clone();

        for _ in 0..=MAX_REDIRECTS {
            let route = self
                .table
                .resolve(&current)
                .ok_or_else(|| ErrorKind::NoRoute {
                    path: current.clone(),
                })?;

            let view = match route.descriptor.target() {
                RouteTarget::Redirect(to) => {
                    trace!(from=%current, %to, "Route redirect");
                    current = to.clone();
                    continue;
                }
                RouteTarget::View(view) => view,
            };

            let request = NavigationRequest {
                path: &current,
                view,
                access: route.descriptor.access(),
            };
            match self.guards.check(&request, session) {
                Decision::Allow => {
                    let redirected_from = (current != requested).then(|| requested.clone());
                    debug!(%requested, path=%current, %view, "Navigation allowed");
                    return Ok(Navigation {
                        resolved: Resolved::View {
                            view: view.clone(),
                            path: current,
                            params: route.params,
                            redirected_from,
                        },
                        requested,
                    });
                }
                Decision::Redirect(to) => {
                    current = to;
                }
                Decision::Defer => {
                    debug!(%requested, path=%current, "Navigation pending session");
                    return Ok(Navigation {
                        resolved: Resolved::Pending { path: current },
                        requested,
                    });
                }
            }
        }

        Err(ErrorKind::RedirectLoop {
            path: requested,
            hops: MAX_REDIRECTS + 1,
        }
        .into())
    }
}

fn ensure_landing(table: &RouteTable, path: &str, forbidden: AccessClass) -> Result<()> {
    let route = table
        .resolve(path)
        .ok_or_else(|| ErrorKind::InvalidConfig(format!("{} does not resolve", path)))?;
    match route.descriptor.target() {
        RouteTarget::View(_) if route.descriptor.access() != forbidden => Ok(()),
        RouteTarget::View(_) => Err(ErrorKind::InvalidConfig(format!(
            "{} must not be {}",
            path, forbidden
        ))
        .into()),
        RouteTarget::Redirect(_) => Err(ErrorKind::InvalidConfig(format!(
            "{} must resolve to a view",
            path
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppPreset;
    use crate::core::identity::MemoryIdentity;
    use crate::core::principal::Principal;
    use crate::core::route::RouteDescriptor;
    use crate::core::session::SessionProvider;
    use crate::RouteGateError;

    fn forum() -> (MemoryIdentity, SessionProvider, Navigator) {
        let identity = MemoryIdentity::new();
        let provider = SessionProvider::new();
        provider.attach(&identity).unwrap();
        let navigator = AppPreset::Forum.navigator(provider.handle()).unwrap();
        (identity, provider, navigator)
    }

    #[test]
    fn signed_out_profile_goes_to_login() {
        let (identity, _provider, navigator) = forum();
        identity.initialize();

        let nav = navigator.navigate("/profile").unwrap();
        assert_eq!(nav.path(), "/login");
        assert_eq!(nav.view().map(|v| &**v), Some("login"));
        assert!(nav.was_redirected());
    }

    #[test]
    fn signed_in_login_goes_home() {
        let (identity, _provider, navigator) = forum();
        identity.initialize();
        identity.notify(Some(Principal::new("uid-1")));

        let nav = navigator.navigate("/login").unwrap();
        assert_eq!(nav.path(), "/");
        assert_eq!(nav.view().map(|v| &**v), Some("home"));
    }

    #[test]
    fn unknown_path_falls_back_to_login() {
        let (identity, _provider, navigator) = forum();
        identity.initialize();

        let nav = navigator.navigate("/does-not-exist").unwrap();
        assert_eq!(nav.path(), "/login");
        match nav.resolved {
            Resolved::View {
                redirected_from, ..
            } => assert_eq!(redirected_from.as_deref(), Some("/does-not-exist")),
            Resolved::Pending { .. } => panic!("expected view"),
        }
    }

    #[test]
    fn unknown_path_signed_in_ends_home() {
        let (identity, _provider, navigator) = forum();
        identity.initialize();
        identity.notify(Some(Principal::new("uid-1")));

        let nav = navigator.navigate("/does-not-exist").unwrap();
        assert_eq!(nav.path(), "/");
    }

    #[test]
    fn params_are_captured() {
        let (identity, _provider, navigator) = forum();
        identity.initialize();
        identity.notify(Some(Principal::new("uid-1")));

        let nav = navigator.navigate("/discussion/abc123?sort=new").unwrap();
        match nav.resolved {
            Resolved::View { view, params, .. } => {
                assert_eq!(&*view, "discussion-detail");
                assert_eq!(params.get("id"), Some("abc123"));
            }
            Resolved::Pending { .. } => panic!("expected view"),
        }
    }

    #[test]
    fn pending_until_first_callback() {
        let (identity, _provider, navigator) = forum();

        let nav = navigator.navigate("/").unwrap();
        assert!(nav.is_pending());
        assert_eq!(nav.path(), "/");

        identity.initialize();
        assert_eq!(navigator.navigate("/").unwrap().path(), "/login");
    }

    #[test]
    fn state_change_visible_without_reload() {
        let (identity, _provider, navigator) = forum();
        identity.initialize();
        assert_eq!(navigator.navigate("/new").unwrap().path(), "/login");

        identity.notify(Some(Principal::new("uid-1")));
        assert_eq!(navigator.navigate("/new").unwrap().path(), "/new");

        identity.notify(None);
        assert_eq!(navigator.navigate("/new").unwrap().path(), "/login");
    }

    #[test]
    fn repeated_navigation_is_stable() {
        let (identity, _provider, navigator) = forum();
        identity.initialize();
        for path in ["/", "/login", "/category/7", "/nope"] {
            assert_eq!(navigator.navigate(path).unwrap(), navigator.navigate(path).unwrap());
        }
    }

    #[test]
    fn navigate_when_ready_waits() {
        tokio_test::block_on(async move {
            let (identity, _provider, navigator) = forum();
            identity.notify(Some(Principal::new("uid-1")));
            identity.initialize();

            let nav = navigator.navigate_when_ready("/login").await.unwrap();
            assert_eq!(nav.path(), "/");
        })
    }

    #[test]
    fn redirect_loop_detected() {
        let table = RouteTable::builder()
            .route(RouteDescriptor::view("/login", "login", AccessClass::Unrestricted).unwrap())
            .route(RouteDescriptor::view("/", "home", AccessClass::Unrestricted).unwrap())
            .route(RouteDescriptor::redirect("/a", "/b").unwrap())
            .route(RouteDescriptor::redirect("/b", "/a").unwrap())
            .route(RouteDescriptor::redirect("*", "/login").unwrap())
            .build()
            .unwrap();
        let provider = SessionProvider::new();
        let navigator =
            Navigator::new(table, AccessGate::new("/login", "/"), provider.handle()).unwrap();

        let err = navigator.navigate("/a").unwrap_err();
        assert!(matches!(err, RouteGateError::RedirectLoop { .. }));
    }

    fn landing_error(table: RouteTable, gate: AccessGate) -> String {
        let provider = SessionProvider::new();
        match Navigator::new(table, gate, provider.handle()).err().unwrap() {
            RouteGateError::Config { description } => description,
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn sign_in_path_must_be_reachable_signed_out() {
        use AccessClass::*;

        let table = RouteTable::builder()
            .route(RouteDescriptor::view("/login", "login", RequiresAuthenticated).unwrap())
            .route(RouteDescriptor::view("/", "home", RequiresAuthenticated).unwrap())
            .route(RouteDescriptor::redirect("*", "/login").unwrap())
            .build()
            .unwrap();
        let description = landing_error(table, AccessGate::new("/login", "/"));
        assert_eq!(description, "/login must not be requires-authenticated");
    }

    #[test]
    fn home_path_must_be_reachable_signed_in() {
        use AccessClass::*;

        let table = RouteTable::builder()
            .route(RouteDescriptor::view("/login", "login", RequiresAnonymous).unwrap())
            .route(RouteDescriptor::view("/", "home", RequiresAnonymous).unwrap())
            .route(RouteDescriptor::redirect("*", "/login").unwrap())
            .build()
            .unwrap();
        let description = landing_error(table, AccessGate::new("/login", "/"));
        assert_eq!(description, "/ must not be requires-anonymous");
    }

    #[test]
    fn landing_paths_must_resolve_to_views() {
        let table = AppPreset::Forum.route_table().unwrap();
        let description = landing_error(table, AccessGate::new("/nope", "/"));
        assert_eq!(description, "/nope must resolve to a view");

        let table = AppPreset::Forum.route_table().unwrap();
        let description = landing_error(table, AccessGate::new("/login", "/nope"));
        assert_eq!(description, "/nope must resolve to a view");
    }
}
