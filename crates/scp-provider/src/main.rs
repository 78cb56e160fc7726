mod commands;

use clap::{Parser, Subcommand};
use scp_profile::ProfileContext;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scp-provider")]
#[command(about = "Samsung SDS Cloud provider: profiles, configuration and schemas", long_about = None)]
#[command(version)]
struct Cli {
    /// Profile directory (defaults to ~/.cmp)
    #[arg(long, global = true, env = "SCP_TF_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit or show the stored profile
    #[command(subcommand)]
    Configure(ConfigureCommands),
    /// Print the resolved provider configuration (secrets masked)
    Resolve {
        /// Profile section to read (SCP_TF_PROFILE)
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// Print provider, resource and data source schemas as JSON
    Schema {
        /// Only print the schema of this resource or data source type
        #[arg(short, long)]
        resource: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigureCommands {
    /// Store a value, e.g. `configure set project-id PROJECT-123`
    Set {
        key: String,
        value: String,
        #[arg(short, long, default_value = "default")]
        profile: String,
        /// Write to the credentials file even for non-secret keys
        #[arg(long)]
        credentials: bool,
    },
    /// Remove a value from both profile files
    Unset {
        key: String,
        #[arg(short, long, default_value = "default")]
        profile: String,
    },
    /// Show the stored values of a profile
    Show {
        #[arg(short, long, default_value = "default")]
        profile: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries JSON output, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let ctx = match cli.config_dir {
        Some(dir) => ProfileContext::with_dir(dir),
        None => ProfileContext::new()?,
    };

    match cli.command {
        Commands::Configure(ConfigureCommands::Set {
            key,
            value,
            profile,
            credentials,
        }) => commands::configure::set(&ctx, &profile, &key, &value, credentials)?,
        Commands::Configure(ConfigureCommands::Unset { key, profile }) => {
            commands::configure::unset(&ctx, &profile, &key)?
        }
        Commands::Configure(ConfigureCommands::Show { profile }) => {
            commands::configure::show(&ctx, &profile)
        }
        Commands::Resolve { profile } => commands::resolve::handle(&ctx, profile)?,
        Commands::Schema { resource } => commands::schema::handle(resource.as_deref())?,
    }

    Ok(())
}
