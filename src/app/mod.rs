//! Route tables of the bundled applications.
//!
//! Both applications sign in at `/login` and land on `/` once signed in.
//! Unknown paths redirect to `/login`, where the gate takes over.
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::common::ErrorKind;
use crate::core::gate::AccessGate;
use crate::core::navigator::Navigator;
use crate::core::route::{AccessClass, RouteDescriptor, RouteTable};
use crate::core::session::SessionHandle;

pub const SIGN_IN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

const FALLBACK_PATTERN: &str = "/:pathMatch(.*)*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AppPreset {
    /// Discussion forum
    Forum,
    /// Voting app
    Vote,
}

impl AppPreset {
    pub fn name(&self) -> &'static str {
        match self {
            AppPreset::Forum => "forum",
            AppPreset::Vote => "vote",
        }
    }

    pub fn gate(&self) -> AccessGate {
        AccessGate::new(SIGN_IN_PATH, HOME_PATH)
    }

    pub fn route_table(&self) -> crate::Result<RouteTable> {
        use AccessClass::*;

        let builder = RouteTable::builder();
        let builder = match self {
            AppPreset::Forum => builder
                .route(RouteDescriptor::view("/login", "login", RequiresAnonymous)?)
                .route(RouteDescriptor::view("/register", "register", RequiresAnonymous)?)
                .route(RouteDescriptor::view(
                    "/forgot-password",
                    "forgot-password",
                    RequiresAnonymous,
                )?)
                .route(RouteDescriptor::view("/", "home", RequiresAuthenticated)?)
                .route(RouteDescriptor::view("/discussions", "discussions", RequiresAuthenticated)?)
                .route(RouteDescriptor::view(
                    "/discussion/:id",
                    "discussion-detail",
                    RequiresAuthenticated,
                )?)
                .route(RouteDescriptor::view("/new", "new-discussion", RequiresAuthenticated)?)
                .route(RouteDescriptor::view("/profile", "profile", RequiresAuthenticated)?)
                .route(RouteDescriptor::view("/category/:id", "category", RequiresAuthenticated)?),
            AppPreset::Vote => builder
                .route(RouteDescriptor::view("/", "home", RequiresAuthenticated)?.with_name("home"))
                .route(
                    RouteDescriptor::view("/login", "login", RequiresAnonymous)?
                        .with_name("login"),
                ),
        };

        builder
            .route(RouteDescriptor::redirect(FALLBACK_PATTERN, SIGN_IN_PATH)?)
            .build()
    }

    pub fn navigator(&self, session: SessionHandle) -> crate::Result<Navigator> {
        Navigator::new(self.route_table()?, self.gate(), session)
    }
}

impl fmt::Display for AppPreset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AppPreset {
    type Err = crate::RouteGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forum" => Ok(AppPreset::Forum),
            "vote" => Ok(AppPreset::Vote),
            _ => Err(crate::common::Error::from(ErrorKind::UnknownPreset(s.to_owned())).into()),
        }
    }
}
