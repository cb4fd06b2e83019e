mod app;
mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use freeagle_core::InviteCode;

use crate::app::App;

#[derive(Parser)]
#[command(name = "freeagle")]
#[command(about = "Find events, share invites and keep track of what you joined")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Claim a nickname
    Login { username: String },
    /// List public events
    Events {
        /// Only show events in this category (e.g. "sports")
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show the event behind an invite code
    Open { code: String },
    /// Join the event behind an invite code
    Accept { code: String },
    /// Decline the event behind an invite code
    Decline { code: String },
    /// Leave an event you joined
    Leave { code: String },
    /// Generate an invite code for an event
    Share { event_id: String },
    /// List the events you joined or shared
    Joined,
    /// Toggle an event as favorite
    Favorite { event_id: String },
    /// List favorite event ids
    Favorites {
        /// Remove all favorites
        #[arg(long)]
        clear: bool,
    },
    /// Show configuration and data paths
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config => commands::config::run(),
        command => {
            let app = App::load()?;
            run(&app, command).await
        }
    }
}

async fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Login { username } => commands::login::run(app, &username).await,
        Commands::Events { category } => commands::events::run(app, category.as_deref()).await,
        Commands::Open { code } => commands::invite::open(app, &parse_code(&code)?).await,
        Commands::Accept { code } => commands::invite::respond(app, &parse_code(&code)?, true).await,
        Commands::Decline { code } => {
            commands::invite::respond(app, &parse_code(&code)?, false).await
        }
        Commands::Leave { code } => commands::invite::leave(app, &parse_code(&code)?).await,
        Commands::Share { event_id } => commands::share::run(app, &event_id).await,
        Commands::Joined => commands::joined::run(app),
        Commands::Favorite { event_id } => commands::favorites::toggle(app, &event_id),
        Commands::Favorites { clear } => commands::favorites::list(app, clear),
        Commands::Config => commands::config::run(),
    }
}

fn parse_code(code: &str) -> Result<InviteCode> {
    Ok(InviteCode::parse(code)?)
}
