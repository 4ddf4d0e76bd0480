//! Redmine Tools CLI: runs the MCP server and manages its configuration.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use redmine_api::RedmineClient;
use redmine_core::config::{Config, HOST_ENV};
use redmine_mcp::{McpServer, ToolHandler};
use redmine_storage::{resolve_api_key, CredentialStore, KeychainStore, API_KEY_ENTRY};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "redmine-tools")]
#[command(author, version, about = "Redmine tools for AI assistants over MCP", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server on stdin/stdout
    Serve,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set a value, e.g. `redmine.url https://redmine.example.com`
    Set { key: String, value: String },

    /// Print a single value
    Get { key: String },

    /// Show current configuration
    Show,

    /// Store the Redmine API key in the OS keychain
    SetApiKey { key: String },

    /// Remove the Redmine API key from the OS keychain
    ClearApiKey,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol, so logs go to stderr
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Serve) => serve().await?,
        Some(Commands::Config { command }) => configure(command)?,
        None => {
            println!("Redmine Tools - Redmine access for AI assistants");
            println!("Run with --help for usage information");
        }
    }

    Ok(())
}

async fn serve() -> anyhow::Result<()> {
    let mut config = Config::load()?;
    config.apply_env(|k| std::env::var(k).ok());

    let url = config.redmine_url().map(str::to_string).with_context(|| {
        format!(
            "Redmine URL not configured. Set {} or run `redmine-tools config set redmine.url <url>`",
            HOST_ENV
        )
    })?;
    let api_key = resolve_api_key(&KeychainStore::new(), |k| std::env::var(k).ok())?;

    let client = RedmineClient::new(&url, api_key)?;
    let handler = ToolHandler::new(Arc::new(client));

    tracing::info!(url = %url, name = %config.server.name, "Starting MCP server on stdio");
    McpServer::new(handler)
        .with_name(config.server.name)
        .run()
        .await?;
    Ok(())
}

fn configure(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }
        ConfigCommands::Get { key } => {
            let config = Config::load()?;
            match config.get(&key)? {
                Some(value) => println!("{}", value),
                None => println!("{} is not set", key),
            }
        }
        ConfigCommands::Show => {
            let config = Config::load()?;
            let store = KeychainStore::new();
            println!("Config file: {}", Config::config_path()?.display());
            println!(
                "redmine.url = {}",
                config.redmine_url().unwrap_or("(not set)")
            );
            println!("server.name = {}", config.server.name);
            println!(
                "api key     = {}",
                if store.exists(API_KEY_ENTRY) {
                    "stored in keychain"
                } else {
                    "(not stored)"
                }
            );
        }
        ConfigCommands::SetApiKey { key } => {
            let key = key.trim();
            anyhow::ensure!(!key.is_empty(), "API key must not be empty");
            KeychainStore::new().store(API_KEY_ENTRY, key)?;
            tracing::info!("API key stored in keychain");
        }
        ConfigCommands::ClearApiKey => {
            KeychainStore::new().delete(API_KEY_ENTRY)?;
            tracing::info!("API key removed from keychain");
        }
    }
    Ok(())
}
