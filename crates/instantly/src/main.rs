use crate::prelude::*;
use clap::Parser;

mod account;
mod campaign;
mod client;
mod config;
mod email;
mod error;
mod lead;
mod mcp;
mod prelude;
mod tools;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Instantly.ai campaigns, leads and accounts as MCP tools and CLI commands"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Instantly API key (v2, bearer token)
    #[clap(long, env = "INSTANTLY_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the Instantly API
    #[clap(long, env = "INSTANTLY_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[clap(long, env = "INSTANTLY_TIMEOUT_SECS", global = true)]
    timeout: Option<u64>,

    /// Timezone used when a campaign does not specify one
    #[clap(long, env = "INSTANTLY_DEFAULT_TIMEZONE", global = true)]
    default_timezone: Option<String>,

    /// Whether to display additional information.
    #[clap(long, env = "INSTANTLY_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Campaign operations
    Campaign(crate::campaign::App),

    /// Sending account operations
    Account(crate::account::App),

    /// Lead operations
    Lead(crate::lead::App),

    /// Email operations
    Email(crate::email::App),

    /// Model Context Protocol server
    MCP(crate::mcp::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Campaign(sub_app) => crate::campaign::run(sub_app, app.global).await,
        SubCommands::Account(sub_app) => crate::account::run(sub_app, app.global).await,
        SubCommands::Lead(sub_app) => crate::lead::run(sub_app, app.global).await,
        SubCommands::Email(sub_app) => crate::email::run(sub_app, app.global).await,
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
