use clap::Parser;
use std::io::Write;
use tracing_subscriber::EnvFilter;

use nvs::config::NvsConfig;
use nvs::context::ExecutionContext;
use nvs::errors::CommandError;
use nvs::manager::LocalManager;
use nvs::outcome::Reporter;
use nvs::router::{self, Command};

/// Log filter variable, e.g. `NVS_LOG=debug`.
const LOG_ENV: &str = "NVS_LOG";

/// Node version switcher.
///
/// Arguments are routed by nvs itself, so clap only captures them.
#[derive(Parser, Debug)]
#[command(name = "nvs", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let ctx = ExecutionContext::from_env();

    let command = Command::resolve(cli.args.first().map(String::as_str));
    let config = match NvsConfig::load(&ctx) {
        Ok(config) => Ok(config),
        // Usage and version never touch the nvs home.
        Err(e) if !command.needs_config() => {
            tracing::debug!("Ignoring configuration error for {:?}: {:#}", command, e);
            Ok(NvsConfig::defaults(ctx.home.clone().unwrap_or_default()))
        }
        Err(e) => Err(e),
    };

    let status = match config {
        Ok(config) => {
            let manager = LocalManager::new(config, &ctx);
            router::invoke(&cli.args, &ctx, &manager, std::io::stdout(), std::io::stderr()).await
        }
        Err(e) => {
            let mut reporter = Reporter::new(ctx.debug, std::io::stdout(), std::io::stderr());
            reporter.fail(&CommandError::Collaborator(e));
            reporter.status()
        }
    };

    let _ = std::io::stdout().flush();
    std::process::exit(status.code());
}
