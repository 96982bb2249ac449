//! Welltech - headless driver for the wellness core
//!
//! This is the binary entry point. All logic lives in the library crates.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use tracing::{error, info};
use wellness_app::config::{init_config_dir, load_settings};
use wellness_app::{Dependencies, DependencyMode};
use wellness_core::AuthProvider;

use welltech::HeadlessEvent;

/// Welltech - drive the wellness features from the command line
#[derive(Parser, Debug)]
#[command(name = "welltech", version)]
#[command(about = "Headless driver for the Welltech wellness core", long_about = None)]
struct Args {
    /// Use in-memory mock clients regardless of configuration
    #[arg(long, global = true)]
    mock: bool,

    /// Directory containing .welltech/config.toml (default: current directory)
    #[arg(long, global = true, value_name = "PATH")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Flow(Flow),

    /// Write a default .welltech/config.toml
    Init,
}

/// Scripted flows, each reported as NDJSON on stdout
#[derive(Subcommand, Debug)]
enum Flow {
    /// Run the demo shell: launch, log in, log out
    Demo,

    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Log in through an identity provider
    Social {
        /// apple, google, facebook or twitter
        #[arg(long)]
        provider: AuthProvider,
        /// Token issued by the provider
        #[arg(long, default_value = "provider-token")]
        token: String,
    },

    /// Record a sample workout and print this week's stats
    Workouts,
}

impl Flow {
    fn name(&self) -> &'static str {
        match self {
            Flow::Demo => "demo",
            Flow::Login { .. } => "login",
            Flow::Signup { .. } => "signup",
            Flow::Social { .. } => "social",
            Flow::Workouts => "workouts",
        }
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    wellness_core::logging::init()?;

    let base = match args.config_dir {
        Some(dir) => dir,
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    match args.command {
        Command::Init => {
            let path = init_config_dir(&base)?;
            eprintln!("Wrote {}", path.display());
            Ok(())
        }
        Command::Flow(flow) => run_flow(flow, &base, args.mock).await,
    }
}

async fn run_flow(flow: Flow, base: &Path, force_mock: bool) -> color_eyre::Result<()> {
    let mut settings = load_settings(base);
    if force_mock {
        settings.dependencies.mode = DependencyMode::Mock;
    }
    let mode = settings.dependencies.mode;
    let name = flow.name();
    info!("Running {} with {} dependencies", name, mode);

    let deps = Dependencies::for_mode(mode, settings.live_options())?;
    let config = settings.store_config();
    let analytics = deps.analytics.clone();

    HeadlessEvent::started(name, mode).emit();

    let success = match flow {
        Flow::Demo => !welltech::run_demo(deps, config).await.is_logging_in,
        Flow::Login { email, password } => {
            welltech::run_login(deps, config, &email, &password)
                .await
                .is_authenticated()
        }
        Flow::Signup { email, password } => {
            welltech::run_sign_up(deps, config, &email, &password)
                .await
                .sign_up_error
                .is_none()
        }
        Flow::Social { provider, token } => {
            welltech::run_social(deps, config, provider, &token)
                .await
                .is_authenticated()
        }
        Flow::Workouts => match welltech::run_workouts(&deps).await {
            Ok(_) => true,
            Err(e) => {
                error!("Workout flow failed: {}", e);
                HeadlessEvent::error(e.to_string(), e.is_fatal()).emit();
                false
            }
        },
    };

    analytics.flush().await;
    HeadlessEvent::finished(name, success).emit();

    if success {
        Ok(())
    } else {
        Err(eyre!("{} did not complete", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login() {
        let args = Args::try_parse_from([
            "welltech",
            "--mock",
            "login",
            "--email",
            "test@example.com",
            "--password",
            "password",
        ])
        .unwrap();

        assert!(args.mock);
        assert!(matches!(
            args.command,
            Command::Flow(Flow::Login { ref email, .. }) if email == "test@example.com"
        ));
    }

    #[test]
    fn test_parse_social_provider() {
        let args = Args::try_parse_from(["welltech", "social", "--provider", "Google"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Flow(Flow::Social {
                provider: AuthProvider::Google,
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        assert!(Args::try_parse_from(["welltech", "social", "--provider", "myspace"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["welltech", "workouts", "--config-dir", "/tmp/wt"]).unwrap();
        assert_eq!(args.config_dir, Some(PathBuf::from("/tmp/wt")));
        assert!(matches!(args.command, Command::Flow(Flow::Workouts)));
    }

    #[test]
    fn test_parse_init() {
        let args = Args::try_parse_from(["welltech", "init"]).unwrap();
        assert!(matches!(args.command, Command::Init));
    }
}
