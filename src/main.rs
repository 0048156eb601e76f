use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use line_relay::cli::commands::serve;
use line_relay::cli::{Args, Command};
use line_relay::translation::print_languages;

#[tokio::main]
async fn main() -> Result<()> {
    // Variables already set in the environment win over `.env`.
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }

    match args.command {
        Some(Command::Languages) => {
            print_languages();
        }
        Some(Command::Serve) | None => {
            let options = serve::ServeOptions {
                config: args.config,
                host: args.host,
                port: args.port,
                model: args.model,
                to: args.to,
            };

            let config = match serve::load_config(&options) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error: {e:#}");
                    std::process::exit(exitcode::CONFIG);
                }
            };

            serve::run_serve(config).await?;
        }
    }

    Ok(())
}
