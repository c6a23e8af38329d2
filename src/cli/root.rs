use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::AppPreset;
use crate::cli::{check, routes, session};
use crate::config::{AppConfig, Application, Initializer};

/// Routegate command
#[derive(Parser, Debug)]
#[command(version, propagate_version = true, subcommand_required = true)]
pub struct RouteGateCommand {
    /// Application options
    #[command(flatten)]
    pub app: AppOptions,
    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Application options
#[derive(Args, Debug)]
pub struct AppOptions {
    /// Configuration file path
    #[arg(long, short = 'C', env = "ROUTEGATE_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    /// Bundled application preset, used when the configuration lists no routes
    #[arg(long, env = "ROUTEGATE_APP", value_enum, global = true)]
    pub app: Option<AppPreset>,
    /// Path signed out users are redirected to
    #[arg(long, global = true)]
    pub sign_in_path: Option<String>,
    /// Path signed in users are redirected to
    #[arg(long, global = true)]
    pub home_path: Option<String>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the route table
    Routes(routes::RoutesCommand),
    /// Evaluate a single navigation
    Check(check::CheckCommand),
    /// Simulate a session read from stdin
    Session(session::SessionCommand),
}

/// Parse command line args
pub fn parse() -> RouteGateCommand {
    RouteGateCommand::parse()
}

impl AppOptions {
    /// Load the configuration file if any, apply overrides and wire the application.
    pub async fn initialize(self) -> crate::Result<Application> {
        let AppOptions {
            config,
            app,
            mut sign_in_path,
            mut home_path,
        } = self;

        let mut initializer = match config {
            Some(path) => Initializer::load_config_file(path).await?,
            None => Initializer::default(),
        };

        let overrides = {
            let mut overrides = AppConfig::default();
            overrides.set_preset(app);
            overrides.set_sign_in_path(&mut sign_in_path);
            overrides.set_home_path(&mut home_path);
            overrides
        };
        initializer.override_app(overrides);

        initializer.build()
    }
}

impl RouteGateCommand {
    pub async fn run(self) -> crate::Result<()> {
        let RouteGateCommand { app, command } = self;
        let app = app.initialize().await?;

        match command {
            Command::Routes(routes) => routes.run(&app),
            Command::Check(check) => check.run(&app),
            Command::Session(session) => session.run(&app).await,
        }
    }
}
