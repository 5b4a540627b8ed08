mod commands;
mod context;
mod host;
mod render;
mod source;
mod utils;

use std::path::PathBuf;

use agenda_core::Granularity;
use anyhow::Result;
use clap::{Parser, Subcommand};
use context::AppContext;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "agenda")]
#[command(about = "Browse your events in month, week and day views")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the calendar grid
    Show {
        /// month, week or day (defaults to default_view from config)
        #[arg(long)]
        view: Option<Granularity>,

        /// Date to center on (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Read events from a JSON file instead of the API
        #[arg(long)]
        events: Option<PathBuf>,
    },
    /// List every event of one day
    Day {
        /// YYYY-MM-DD
        date: String,

        #[arg(long)]
        events: Option<PathBuf>,
    },
    /// Show the details of one event
    Event {
        id: i64,

        /// Look for the event in the month of this date
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        events: Option<PathBuf>,
    },
    /// Navigate the calendar interactively
    Browse {
        #[arg(long)]
        view: Option<Granularity>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        events: Option<PathBuf>,
    },
    /// Store an API token for requests to the backend
    Login {
        /// Prompted for when omitted
        #[arg(long)]
        token: Option<String>,
    },
    /// Forget the stored API token
    Logout,
    /// Show configuration paths and settings
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = AppContext::load()?;

    match cli.command {
        Commands::Show { view, date, events } => {
            let source = ctx.source(events);
            commands::show::run(&ctx, source, view, date).await
        }
        Commands::Day { date, events } => {
            let source = ctx.source(events);
            commands::day::run(&ctx, source, date).await
        }
        Commands::Event { id, date, events } => {
            let source = ctx.source(events);
            commands::event::run(&ctx, source, id, date).await
        }
        Commands::Browse { view, date, events } => {
            let source = ctx.source(events);
            commands::browse::run(&ctx, source, view, date).await
        }
        Commands::Login { token } => commands::login::run(&ctx, token).await,
        Commands::Logout => commands::logout::run(&ctx),
        Commands::Config => commands::config::run(&ctx),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "agenda=debug,agenda_core=debug"
    } else {
        "agenda=info,agenda_core=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
