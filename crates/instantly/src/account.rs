//! Sending accounts (`GET /accounts`)

use instantly_core::errors::ApiFailure;
use instantly_core::validation::{ListArgs, ToolName};
use serde_json::{json, Value};

use crate::client::InstantlyClient;
use crate::prelude::{println, *};
use crate::tools::fetch_listing;

#[derive(Debug, clap::Parser)]
#[command(name = "account")]
#[command(about = "Sending account operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List sending accounts (use their emails as a campaign's email_list)
    #[clap(name = "list")]
    List(ListOptions),
}

#[derive(Debug, clap::Args)]
pub struct ListOptions {
    /// Maximum number of results per page
    #[arg(short, long)]
    limit: Option<u32>,

    /// Cursor from the previous page
    #[arg(long)]
    starting_after: Option<String>,

    /// Fetch every page
    #[arg(long)]
    all: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Public data function - used by both CLI and MCP
pub async fn list_accounts_data(
    client: &InstantlyClient,
    page: &ListArgs,
) -> Result<Value, ApiFailure> {
    fetch_listing(page, move |params| client.get("/accounts", params.to_query())).await
}

/// Module entry point
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::List(options) => list_handler(options, global).await,
    }
}

async fn list_handler(options: ListOptions, global: crate::Global) -> Result<()> {
    let raw = json!({
        "limit": options.limit,
        "starting_after": options.starting_after,
        "get_all": options.all,
    });

    let data = crate::tools::run_cli(&global, ToolName::ListAccounts, raw).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    let items = listing_items(&data);
    println!("Found {} account(s):\n", items.len());
    if items.is_empty() {
        return Ok(());
    }

    print_items(
        items,
        &[
            ("Email", "email"),
            ("First Name", "first_name"),
            ("Last Name", "last_name"),
            ("Status", "status"),
            ("Daily Limit", "daily_limit"),
        ],
    );
    print_next_page_hint(&data, "account list");

    Ok(())
}
