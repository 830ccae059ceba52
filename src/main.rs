//! Media Transcriber - command-line client host.

#![deny(clippy::all)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mediatranscriber::auth::token::ACCESS_TOKEN_ENV;
use mediatranscriber::auth::StaticTokenProvider;
use mediatranscriber::config::{ConfigSource, LayeredConfig};
use mediatranscriber::graph::UserInfo;
use mediatranscriber::{AppError, AppServices};

#[derive(Parser)]
#[command(name = "mediatranscriber", version, about = "Media transcriber client")]
struct Cli {
    /// Extra configuration file layered over the defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the effective client registrations.
    ShowConfig,
    /// Call the backend API health check.
    Ping,
    /// Show the signed-in user. Reads the token from GRAPH_ACCESS_TOKEN.
    Me,
}

fn main() {
    let cli = Cli::parse();

    init_logging();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli)) {
        error!("{:#}", e);
        match e.downcast_ref::<AppError>() {
            Some(app_error) => {
                eprintln!("{}", app_error.user_message());
                if app_error.requires_sign_in() {
                    eprintln!("{}", sign_in_hint());
                }
            }
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn sign_in_hint() -> String {
    format!(
        "Sign in with your Azure AD account, then export the Graph access token as {}.",
        ACCESS_TOKEN_ENV
    )
}

/// Initialize tracing/logging.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = LayeredConfig::load(cli.config.as_deref())
        .map_err(AppError::from)
        .context("Failed to load configuration")?;

    let app_name = config
        .get("App:Name")
        .unwrap_or_else(|| "Media Transcriber".to_string());
    info!("Starting {} v{}", app_name, env!("CARGO_PKG_VERSION"));

    let services = AppServices::build(&config, Arc::new(StaticTokenProvider::from_env()))?;

    match cli.command {
        Command::ShowConfig => show_config(&services),
        Command::Ping => {
            let body = services.api().ping().await.map_err(AppError::from)?;
            println!("{}", body);
        }
        Command::Me => {
            let graph = services
                .graph()
                .ok_or_else(|| AppError::ClientNotRegistered("GraphAPI".into()))?;

            let profile = graph.get_user_profile().await.map_err(AppError::from)?;
            let organization = graph.get_organization().await.map_err(AppError::from)?;
            let user_info = UserInfo::new(&profile, &organization);

            println!("{}", serde_json::to_string_pretty(&user_info)?);
        }
    }

    Ok(())
}

fn show_config(services: &AppServices) {
    let graph = services.graph_registration();
    let auth = services.auth();

    println!("{}", graph.name);
    println!("  root address:    {}", graph.root_address());
    println!("  scopes:          {}", graph.scopes.join(" "));
    println!("  authorized urls: {}", graph.authorized_urls().join(", "));
    println!("TranscriberApi");
    println!("  root address:    {}", services.api().root_address());
    println!("AzureAd");
    println!("  authority:       {}", auth.authority);
    println!("  authorize url:   {}", auth.authorize_url());
    println!("  sign-in scopes:  {}", auth.default_access_token_scopes.join(" "));
}
