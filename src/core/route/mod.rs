mod pattern;
pub use self::pattern::{Params, PathPattern};
pub(crate) use self::pattern::normalize;

mod table;
pub use self::table::{
    RouteDescriptor, RouteMatch, RouteTable, RouteTableBuilder, RouteTarget, ViewId,
};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Requirement a route places on the presence of a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessClass {
    RequiresAuthenticated,
    RequiresAnonymous,
    #[default]
    Unrestricted,
}

impl fmt::Display for AccessClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            AccessClass::RequiresAuthenticated => "requires-authenticated",
            AccessClass::RequiresAnonymous => "requires-anonymous",
            AccessClass::Unrestricted => "unrestricted",
        };
        f.write_str(s)
    }
}
