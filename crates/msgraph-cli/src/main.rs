//! msgraph CLI - Command-line interface to the Microsoft Graph API
//!
//! Authenticates with the client-credentials flow using settings from the
//! configuration file, `MSGRAPH_*` environment variables, or flags.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

use commands::{completions::CompletionsCommand, user::UserCommand};
use config::{Config, Overrides};
use output::{get_formatter, OutputFormat};

#[derive(Debug, Parser)]
#[command(
    name = "msgraph",
    version,
    about = "Query the Microsoft Graph API as an app registration"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tenant domain, e.g. contoso.onmicrosoft.com
    #[arg(long, global = true)]
    tenant_domain: Option<String>,

    /// OAuth2 client ID
    #[arg(long = "id", global = true)]
    client_id: Option<String>,

    /// OAuth2 client secret
    #[arg(long = "secret", global = true)]
    client_secret: Option<String>,

    /// Enable debug logging in the Graph client
    #[arg(short, long, global = true)]
    debug: bool,

    /// Dump HTTP requests and responses to stderr
    #[arg(long = "httpdebug", global = true)]
    http_debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// User commands
    #[command(subcommand)]
    User(UserCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            tenant_domain: self.tenant_domain.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            debug: self.debug,
            http_debug: self.http_debug,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    if let Err(err) = run(cli).await {
        get_formatter(format).error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Config::discover(cli.config.as_deref())?
        .with_env(|key| std::env::var(key).ok())
        .with_overrides(&cli.overrides());

    // Setup tracing
    let filter = match (cli.verbose, settings.debug) {
        (0, false) => "info",
        (0, true) | (1, _) => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::User(cmd) => cmd.execute(&settings.into_api(), format).await,
        Commands::Completions(cmd) => cmd.execute(),
    }
}
