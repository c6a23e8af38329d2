use std::path::Path;

use tokio::fs;

use crate::common::{debug, info};
use crate::config::{config, AppConfig, Config};
use crate::core::identity::MemoryIdentity;
use crate::core::navigator::Navigator;
use crate::core::session::SessionProvider;

#[derive(Debug, Default)]
pub struct Initializer {
    pub config: Config,
}

/// Wired application: identity service, session provider and navigator.
pub struct Application {
    pub name: String,
    pub identity: MemoryIdentity,
    pub session: SessionProvider,
    pub navigator: Navigator,
}

impl Initializer {
    pub async fn load_config_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        debug!("Load config file {}", path.display());
        let content = fs::read_to_string(path).await?;
        let config = config::parse(&content)?;

        Ok(Self { config })
    }

    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Override file values with the given ones.
    pub fn override_app(&mut self, mut app: AppConfig) {
        self.config.app.override_merge(&mut app);
    }

    pub fn build(self) -> crate::Result<Application> {
        let Config { app, identity } = self.config;

        let name = app.name();
        let identity = MemoryIdentity::with_users(identity.users)?;

        let session = SessionProvider::new();
        session.attach(&identity)?;

        let navigator = Navigator::new(app.route_table()?, app.gate(), session.handle())?;
        info!(app=%name, routes=navigator.table().len(), "Application initialized");

        Ok(Application {
            name,
            identity,
            session,
            navigator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppPreset;
    use crate::core::session::SessionState;

    #[test]
    fn build_default_application() {
        let app = Initializer::default().build().unwrap();
        assert_eq!(app.name, "forum");
        assert!(app.session.is_attached());
        assert_eq!(app.navigator.session().current(), SessionState::Unknown);

        app.identity.initialize();
        assert_eq!(app.navigator.navigate("/profile").unwrap().path(), "/login");
    }

    #[test]
    fn override_preset() {
        let mut initializer = Initializer::default();
        let mut app = AppConfig::default();
        app.set_preset(Some(AppPreset::Vote));
        initializer.override_app(app);

        let app = initializer.build().unwrap();
        assert_eq!(app.name, "vote");
        assert_eq!(app.navigator.table().len(), 3);
    }
}
