use serde::Deserialize;

use crate::app::{AppPreset, HOME_PATH, SIGN_IN_PATH};
use crate::common::{ErrorKind, Result};
use crate::core::gate::AccessGate;
use crate::core::identity::UserEntry;
use crate::core::route::{AccessClass, RouteDescriptor, RouteTable};

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

// Application routing configuration.
#[derive(Deserialize, Debug, Default)]
pub struct AppConfig {
    // Display name, defaults to the preset name.
    name: Option<String>,
    // Bundled route table used when no routes are listed.
    preset: Option<AppPreset>,
    // Where signed out users are sent.
    sign_in_path: Option<String>,
    // Where signed in users are sent away from anonymous-only routes.
    home_path: Option<String>,
    // Ordered route list, first match wins.
    #[serde(default)]
    routes: Vec<RouteEntry>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RouteEntry {
    pub path: String,
    #[serde(default)]
    pub view: Option<String>,
    #[serde(default)]
    pub redirect: Option<String>,
    #[serde(default)]
    pub access: AccessClass,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct IdentityConfig {
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

impl AppConfig {
    const DEFAULT_PRESET: AppPreset = AppPreset::Forum;

    pub fn set_name(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.name = Some(val)
        }
    }
    pub fn set_preset(&mut self, val: Option<AppPreset>) {
        if let Some(val) = val {
            self.preset = Some(val)
        }
    }
    pub fn set_sign_in_path(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.sign_in_path = Some(val)
        }
    }
    pub fn set_home_path(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.home_path = Some(val)
        }
    }
    pub(crate) fn override_merge(&mut self, other: &mut AppConfig) {
        self.set_name(&mut other.name);
        self.set_preset(other.preset);
        self.set_sign_in_path(&mut other.sign_in_path);
        self.set_home_path(&mut other.home_path);
        if !other.routes.is_empty() {
            self.routes = std::mem::take(&mut other.routes);
        }
    }

    fn preset(&self) -> AppPreset {
        self.preset.unwrap_or(AppConfig::DEFAULT_PRESET)
    }

    pub fn name(&self) -> String {
        match (&self.name, self.routes.is_empty()) {
            (Some(name), _) => name.clone(),
            (None, true) => self.preset().name().to_owned(),
            (None, false) => "custom".to_owned(),
        }
    }

    pub(crate) fn gate(&self) -> AccessGate {
        AccessGate::new(
            self.sign_in_path.as_deref().unwrap_or(SIGN_IN_PATH),
            self.home_path.as_deref().unwrap_or(HOME_PATH),
        )
    }

    /// Listed routes take precedence over the preset.
    pub(crate) fn route_table(&self) -> crate::Result<RouteTable> {
        if self.routes.is_empty() {
            return self.preset().route_table();
        }

        self.routes
            .iter()
            .try_fold(RouteTable::builder(), |builder, entry| {
                Ok::<_, crate::RouteGateError>(builder.route(entry.to_descriptor()?))
            })?
            .build()
    }
}

impl RouteEntry {
    fn to_descriptor(&self) -> crate::Result<RouteDescriptor> {
        let descriptor = match (&self.view, &self.redirect) {
            (Some(view), None) => RouteDescriptor::view(&self.path, view.clone(), self.access)?,
            (None, Some(to)) if self.access == AccessClass::Unrestricted => {
                RouteDescriptor::redirect(&self.path, to.clone())?
            }
            (None, Some(_)) => {
                let reason = "redirect routes cannot carry an access class";
                return Err(invalid(format!("route {}: {}", self.path, reason)));
            }
            _ => {
                let reason = "exactly one of view or redirect is required";
                return Err(invalid(format!("route {}: {}", self.path, reason)));
            }
        };
        Ok(match &self.name {
            Some(name) => descriptor.with_name(name.clone()),
            None => descriptor,
        })
    }
}

fn invalid(description: String) -> crate::RouteGateError {
    crate::common::Error::from(ErrorKind::InvalidConfig(description)).into()
}

pub(crate) fn parse(s: &str) -> Result<Config> {
    Ok(serde_yaml::from_str::<Config>(s)?)
}
