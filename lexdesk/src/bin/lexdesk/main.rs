mod commands;
mod output;
mod theme;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lexdesk::config::AppConfig;

use output::{GlobalOptions, OutputFormat, OutputManager};

#[derive(Parser)]
#[command(name = "lexdesk")]
#[command(version)]
#[command(
    about = "Inspect LexDesk request mapping and field assignment",
    long_about = r#"Runs request bodies through the same mappers the LexDesk backend uses.

Commands:
  patch     Show the sparse update map an update request produces
  create    Build a new record from a create request (--save stores it)
  assign    Assign an untyped map onto a record and report field errors
  config    Show the resolved configuration
  entities  List the known entities
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Configuration file (defaults to ./lexdesk.toml when present)
    #[arg(long, global = true, env = "LEXDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an update request and print its sparse update map
    Patch {
        /// Entity or collection name, e.g. `case` or `cases`
        entity: String,
        /// JSON request body
        file: PathBuf,
    },

    /// Decode a create request and print the resulting record
    Create {
        entity: String,
        file: PathBuf,

        /// Insert the record into the configured store
        #[arg(long)]
        save: bool,
    },

    /// Assign an untyped JSON object onto a default record
    Assign {
        entity: String,
        file: PathBuf,

        /// Exit with an error when any field error is reported
        #[arg(long)]
        strict: bool,
    },

    /// Print the resolved configuration
    Config,

    /// List registered entities
    Entities,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.filter.as_str())).init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        no_color: cli.no_color,
    });

    if let Err(err) = run(cli.command, &config, &output).await {
        output.error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &AppConfig, output: &OutputManager) -> Result<()> {
    match command {
        Commands::Patch { entity, file } => commands::handle_patch(&entity, &file, output).await,
        Commands::Create { entity, file, save } => {
            commands::handle_create(&entity, &file, save.then_some(config), output).await
        }
        Commands::Assign { entity, file, strict } => {
            commands::handle_assign(&entity, &file, strict || config.assign.strict, output).await
        }
        Commands::Config => commands::handle_config(config, output),
        Commands::Entities => {
            commands::handle_entities(output);
            Ok(())
        }
    }
}
