//! nibl CLI - static site generator with a live reload dev server.
//!
//! Provides commands for:
//! - `gen`: Build the site into `public/`
//! - `serve`: Build, watch, rebuild and serve with live reload
//! - `story`: Turn a compiled story graph into content pages

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{Project, StoryArgs};
use error::CliError;
use output::Output;

/// nibl - static site generator.
#[derive(Parser)]
#[command(name = "nibl", version, about)]
struct Cli {
    /// Enable debug logging and per-page build output.
    #[arg(long, global = true)]
    debug: bool,

    /// Disable HTML sanitization of rendered pages.
    #[arg(long = "unsafe", global = true)]
    unsafe_html: bool,

    /// Port for the dev server.
    #[arg(long, global = true, default_value_t = 1313)]
    port: u16,

    /// Host for the dev server.
    #[arg(long, global = true, default_value = "127.0.0.1")]
    host: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site.
    Gen,
    /// Build, then serve with live reload.
    Serve,
    /// Materialize a compiled story into content files.
    Story(StoryArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --debug forces DEBUG, otherwise use RUST_LOG or default to INFO
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run(cli) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let root = std::env::current_dir()?;
    let project = Project::new(&root, cli.unsafe_html, cli.debug);

    match cli.command {
        Commands::Gen => commands::generate::execute(&project),
        Commands::Serve => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::serve::execute(project, cli.host, cli.port))
        }
        Commands::Story(args) => args.execute(&project),
    }
}
