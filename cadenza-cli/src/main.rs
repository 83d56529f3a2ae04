//! cadenza CLI
//!
//! Remote control for a streaming-music account from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Authorize access to the account (one-time)
//! cadenza login
//!
//! # One-off free-form command
//! cadenza do "play bohemian rhapsody"
//!
//! # Interactive shell
//! cadenza shell
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cadenza_core::{
    auth::{AuthClient, AuthConfig},
    dispatch::Dispatcher,
    interpret::{self, Intent},
    manager::CredentialManager,
    remote::{HttpRemote, RemoteApi},
    store::{CredentialStore, FileStore},
};

mod config;
mod output;
mod shell;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "cadenza")]
#[command(about = "Remote control for your streaming-music account")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to an alternative configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit outcomes as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize access to the streaming account
    Login,

    /// Discard the stored credential
    Logout,

    /// Run one free-form command, e.g. `cadenza do "play some jazz"`
    Do {
        /// The command text
        command: Vec<String>,
    },

    /// Interactive command shell
    Shell,

    /// Show what is currently playing
    Status,

    /// Resume playback, or search for a track and play it
    Play {
        /// Optional search query
        query: Vec<String>,
    },

    /// Pause playback
    Pause,

    /// Skip to the next track
    Next,

    /// Return to the previous track
    Previous,

    /// Set the playback volume
    Volume {
        /// Level between 0 and 100
        level: u8,
    },

    /// Jump to a position in the current track
    Seek {
        /// Position in seconds
        seconds: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let format = if cli.json {
        output::Format::Json
    } else {
        output::Format::Text
    };

    let dispatcher = build_dispatcher(&config)?;
    dispatcher
        .manager()
        .initialize()
        .await
        .context("failed to initialize credential storage")?;

    match cli.command {
        Commands::Login => login(&dispatcher).await,
        Commands::Logout => {
            dispatcher.manager().logout().await?;
            println!("Logged out; stored credential discarded.");
            Ok(())
        }
        Commands::Do { command } => {
            let text = command.join(" ");
            if text.trim().is_empty() {
                bail!("no command given");
            }
            run_command(&dispatcher, &text, format).await
        }
        Commands::Shell => shell::run(&dispatcher, format).await,
        Commands::Status => run_intent(&dispatcher, Intent::Status, format).await,
        Commands::Play { query } => {
            let intent = if query.is_empty() {
                Intent::Play
            } else {
                Intent::PlaySearchQuery(query.join(" "))
            };
            run_intent(&dispatcher, intent, format).await
        }
        Commands::Pause => run_intent(&dispatcher, Intent::Pause, format).await,
        Commands::Next => run_intent(&dispatcher, Intent::Next, format).await,
        Commands::Previous => run_intent(&dispatcher, Intent::Previous, format).await,
        Commands::Volume { level } => {
            if level > 100 {
                bail!("volume must be between 0 and 100");
            }
            run_intent(&dispatcher, Intent::SetVolume(level), format).await
        }
        Commands::Seek { seconds } => seek(&dispatcher, seconds).await,
    }
}

fn build_dispatcher(config: &CliConfig) -> Result<Dispatcher<FileStore, HttpRemote>> {
    let store = match &config.credential_path {
        Some(path) => FileStore::new(path.clone()),
        None => FileStore::open_default().context("failed to locate credential storage")?,
    };

    let auth_config = AuthConfig::new(
        config.client_id.clone(),
        config.client_secret.clone(),
        config.redirect_uri.clone(),
    )
    .with_auth_url(config.auth_url.clone())
    .with_token_url(config.token_url.clone());

    let manager = CredentialManager::new(store, AuthClient::new(auth_config));
    let remote = HttpRemote::with_base_url(config.api_base_url.clone());
    tracing::debug!(api_base_url = %config.api_base_url, "using playback API");

    Ok(Dispatcher::new(manager, remote))
}

/// Parse free-form text and dispatch the resulting intent.
async fn run_command<S, R>(
    dispatcher: &Dispatcher<S, R>,
    text: &str,
    format: output::Format,
) -> Result<()>
where
    S: CredentialStore,
    R: RemoteApi,
{
    run_intent(dispatcher, interpret::parse(text), format).await
}

async fn run_intent<S, R>(
    dispatcher: &Dispatcher<S, R>,
    intent: Intent,
    format: output::Format,
) -> Result<()>
where
    S: CredentialStore,
    R: RemoteApi,
{
    match dispatcher.dispatch(intent).await {
        Ok(outcome) => output::render(&outcome, format),
        Err(e) if e.requires_reauthorization() => {
            println!("Not authenticated with the streaming service.");
            println!("Run `cadenza login` to authorize access.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn login(dispatcher: &Dispatcher<FileStore, HttpRemote>) -> Result<()> {
    let (url, state) = dispatcher.manager().authorize_url()?;

    println!("Visit the following URL and approve access:");
    println!();
    println!("  {}", url);
    println!();
    println!("Then paste the redirect URL (or just the code) here:");
    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin()
        .lock()
        .read_line(&mut input)
        .context("failed to read the authorization response")?;

    let code = extract_code(&input, &state)?;
    let credential = dispatcher.manager().complete_authorization(&code).await?;

    println!(
        "Authorized. Access token valid until {}.",
        credential.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}

/// Pull the authorization code out of a pasted redirect URL, verifying the
/// CSRF state when present. Bare codes are accepted as-is.
fn extract_code(input: &str, expected_state: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        bail!("no authorization code given");
    }

    let Ok(url) = url::Url::parse(input) else {
        return Ok(input.to_string());
    };

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(state) = state {
        if state != expected_state {
            bail!("authorization state mismatch; restart the login flow");
        }
    }

    code.context("redirect URL does not contain a code parameter")
}

async fn seek(dispatcher: &Dispatcher<FileStore, HttpRemote>, seconds: u64) -> Result<()> {
    let credential = match dispatcher.manager().ensure_fresh().await {
        Ok(credential) => credential,
        Err(e) if e.requires_reauthorization() => {
            println!("Not authenticated with the streaming service.");
            println!("Run `cadenza login` to authorize access.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    dispatcher
        .remote()
        .seek(&credential.access_token, seconds * 1000)
        .await?;
    println!("Jumped to {}s", seconds);
    Ok(())
}
