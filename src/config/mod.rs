mod initialize;
pub use initialize::{Application, Initializer};

mod config;
pub use config::{AppConfig, Config, IdentityConfig, RouteEntry};

pub mod env {
    pub const LOG_DIRECTIVE: &str = "ROUTEGATE_LOG";
    pub const CONFIG_PATH: &str = "ROUTEGATE_CONFIG";
    pub const APP_PRESET: &str = "ROUTEGATE_APP";
}
