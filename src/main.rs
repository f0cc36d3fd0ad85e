//! Parley - terminal chat client
//!
#![doc = "Parley - terminal chat client"]
#![doc = "Main entry point for the Parley application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use parley::cli::{Cli, Commands};
use parley::commands;
use parley::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { new, resume } => {
            if let Some(r) = &resume {
                tracing::debug!("Resuming conversation: {}", r);
            }
            commands::chat::run_chat(config, new, resume).await?;
            Ok(())
        }
        Commands::Ask {
            prompt,
            conversation,
        } => {
            commands::ask::run_ask(config, prompt, conversation).await?;
            Ok(())
        }
        Commands::History { command } => {
            let mut store = commands::open_store(&config.storage)?;
            commands::history::handle_history(command, &mut store, config.chat.show_timestamps)?;
            Ok(())
        }
        Commands::Auth { logout } => {
            commands::auth::authenticate(logout).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "parley=debug" } else { "parley=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
