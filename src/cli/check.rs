use std::sync::Arc;

use clap::{Args, ValueEnum};

use crate::cli::describe;
use crate::config::Application;
use crate::core::principal::Principal;
use crate::core::session::SessionState;
use crate::{RouteGateError, Result};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionArg {
    /// No auth state delivered yet
    Unknown,
    /// No principal
    SignedOut,
    /// A principal is present
    SignedIn,
}

/// Evaluate one navigation against a fixed session state
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Path to navigate to
    path: String,
    /// Session state the gate sees
    #[arg(long, value_enum, default_value_t = SessionArg::SignedOut)]
    session: SessionArg,
    /// Principal uid used for a signed in session
    #[arg(long, default_value = "uid-cli")]
    uid: String,
    /// Print the outcome as json
    #[arg(long)]
    json: bool,
}

impl CheckCommand {
    pub fn run(self, app: &Application) -> Result<()> {
        let CheckCommand {
            path,
            session,
            uid,
            json,
        } = self;

        let state = match session {
            SessionArg::Unknown => SessionState::Unknown,
            SessionArg::SignedOut => SessionState::SignedOut,
            SessionArg::SignedIn => SessionState::SignedIn(Arc::new(Principal::new(uid))),
        };

        let navigation = app.navigator.navigate_with(&path, &state)?;
        if json {
            let out = serde_json::to_string_pretty(&navigation).map_err(|err| {
                RouteGateError::Internal {
                    description: err.to_string(),
                }
            })?;
            println!("{}", out);
        } else {
            println!("{}", describe(&navigation));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Initializer;

    #[test]
    fn json_outcome() {
        let app = Initializer::default().build().unwrap();
        let navigation = app
            .navigator
            .navigate_with("/profile", &SessionState::SignedOut)
            .unwrap();
        let value = serde_json::to_value(&navigation).unwrap();

        assert_eq!(value["requested"], "/profile");
        assert_eq!(value["resolved"]["outcome"], "view");
        assert_eq!(value["resolved"]["view"], "login");
        assert_eq!(value["resolved"]["redirected_from"], "/profile");
        assert_eq!(describe(&navigation), "/profile -> /login (view login, redirected)");
    }

    #[test]
    fn pending_outcome() {
        let app = Initializer::default().build().unwrap();
        let navigation = app
            .navigator
            .navigate_with("/new", &SessionState::Unknown)
            .unwrap();
        assert_eq!(
            serde_json::to_value(&navigation).unwrap()["resolved"]["outcome"],
            "pending"
        );
    }
}
