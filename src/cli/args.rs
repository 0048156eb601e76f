use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "line-relay")]
#[command(about = "LINE webhook relay that summarizes messages and translates the reply")]
#[command(version)]
pub struct Args {
    /// Config file (defaults to ~/.config/line-relay/config.toml)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short = 'p', long, global = true)]
    pub port: Option<u16>,

    /// Completion model for new sessions
    #[arg(short = 'm', long, global = true)]
    pub model: Option<String>,

    /// Initial translation target language (e.g., en, ja)
    #[arg(short = 't', long = "to", global = true)]
    pub to: Option<String>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the webhook server (default)
    Serve,
    /// List supported target language codes
    Languages,
}
