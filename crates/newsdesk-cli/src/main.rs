use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use newsdesk_application::AppContext;
use newsdesk_infrastructure::ConfigService;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "newsdesk")]
#[command(about = "newsdesk - command line client for the news site", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.config/newsdesk/config.toml
    #[arg(long, global = true, env = "NEWSDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "NEWSDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List posts
    Posts {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<i64>,
        /// e.g. -created_at, -views_count
        #[arg(long)]
        ordering: Option<String>,
        /// List your own posts, drafts included
        #[arg(long)]
        mine: bool,
    },
    /// Show one post
    Post { slug: String },
    /// Show the comments of a post as threads
    Comments {
        post_id: i64,
        /// Load every reply bucket before printing
        #[arg(long)]
        full: bool,
    },
    /// Show subscription and pinned post
    Subscription,
    /// Pin a post to the top of the feed
    Pin { post_id: i64 },
    /// Remove your pinned post
    Unpin,
    /// Resolve a front-end path through the navigation guards
    Route { path: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("newsdesk=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config_service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new().context("Failed to locate config directory")?,
    };
    let config = config_service
        .load()
        .with_context(|| format!("Failed to load {}", config_service.path().display()))?;

    let (ctx, mut notifications) =
        AppContext::from_config(config).context("Failed to set up client")?;
    let out = commands::Output::new(cli.json);

    let outcome = run(&ctx, &out, cli.command).await;
    commands::drain_notifications(&mut notifications);
    outcome
}

async fn run(ctx: &AppContext, out: &commands::Output, command: Commands) -> Result<()> {
    if !matches!(command, Commands::Route { .. }) {
        ctx.session().initialize().await;
    }

    match command {
        Commands::Login { email, password } => commands::auth::login(ctx, out, email, password).await,
        Commands::Logout => commands::auth::logout(ctx, out).await,
        Commands::Whoami => commands::auth::whoami(ctx, out).await,
        Commands::Posts {
            page,
            search,
            category,
            ordering,
            mine,
        } => {
            let filters = commands::posts::ListArgs {
                page,
                search,
                category,
                ordering,
                mine,
            };
            commands::posts::list(ctx, out, filters).await
        }
        Commands::Post { slug } => commands::posts::show(ctx, out, &slug).await,
        Commands::Comments { post_id, full } => {
            commands::comments::show(ctx, out, post_id, full).await
        }
        Commands::Subscription => commands::subscription::status(ctx, out).await,
        Commands::Pin { post_id } => commands::subscription::pin(ctx, out, post_id).await,
        Commands::Unpin => commands::subscription::unpin(ctx, out).await,
        Commands::Route { path } => commands::route::resolve(ctx, out, &path).await,
    }
}
