use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod app;
mod commands;

use app::AppBootstrap;

#[derive(Parser)]
#[command(name = "threadline")]
#[command(about = "Threadline - chat threads with optimistic replies", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for persisted threads and the remembered token
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with a phone number and verification code
    Login {
        /// Phone number without calling code
        #[arg(long)]
        phone: String,
        /// Six-digit verification code
        #[arg(long)]
        code: String,
        /// Country code (cca2), defaults to the configured country
        #[arg(long)]
        country: Option<String>,
        /// Keep the token for this process only
        #[arg(long)]
        no_remember: bool,
    },
    /// Log out and clear local thread data
    Logout,
    /// List countries available on the login form
    Countries,
    /// List threads
    Threads {
        /// Reload threads from the server first
        #[arg(long)]
        refresh: bool,
    },
    /// Send a message and wait for the reply
    Send {
        /// Thread to continue (a new thread is started when omitted)
        #[arg(long)]
        thread: Option<String>,
        /// Message text
        text: String,
    },
    /// Delete a thread
    Delete {
        /// Thread to delete
        id: String,
        /// Thread currently open in the view
        #[arg(long)]
        current: Option<String>,
    },
    /// Run a scripted in-memory session
    Demo,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("threadline=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // The demo runs against in-memory stores and never touches the data dir
    if let Commands::Demo = cli.command {
        let config = AppBootstrap::load_config(cli.config.as_deref())?;
        return commands::demo::run(config).await;
    }

    let app = AppBootstrap::new(cli.config.as_deref(), cli.data_dir.as_deref())?;
    run(cli.command, &app).await
}

async fn run(command: Commands, app: &AppBootstrap) -> Result<()> {
    match command {
        Commands::Login {
            phone,
            code,
            country,
            no_remember,
        } => commands::auth::login(app, &phone, &code, country.as_deref(), !no_remember).await,
        Commands::Logout => commands::auth::logout(app),
        Commands::Countries => commands::countries::list(app).await,
        Commands::Threads { refresh } => commands::chat::threads(app, refresh).await,
        Commands::Send { thread, text } => commands::chat::send(app, thread.as_deref(), &text).await,
        Commands::Delete { id, current } => {
            commands::chat::delete(app, &id, current.as_deref()).await
        }
        Commands::Demo => commands::demo::run(app.config.clone()).await,
    }
}
