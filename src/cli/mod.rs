mod root;
pub use root::{parse, AppOptions, Command, RouteGateCommand};

pub mod check;
pub mod routes;
pub mod session;

use crate::core::navigator::{Navigation, Resolved};

// One line summary of a navigation outcome.
pub(crate) fn describe(navigation: &Navigation) -> String {
    match &navigation.resolved {
        Resolved::View {
            view,
            path,
            params,
            redirected_from,
        } => {
            let mut line = match redirected_from {
                Some(from) => format!("{} -> {} (view {}, redirected)", from, path, view),
                None => format!("{} (view {})", path, view),
            };
            if !params.is_empty() {
                let params = params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join(", ");
                line.push_str(&format!(" [{}]", params));
            }
            line
        }
        Resolved::Pending { path } => {
            format!("{} pending, waiting for the identity service", path)
        }
    }
}
