//! Email listing and single-address verification

use instantly_core::errors::ApiFailure;
use instantly_core::validation::{ListEmailsArgs, ToolName, VerifyEmailArgs};
use serde_json::{json, Value};

use crate::client::InstantlyClient;
use crate::prelude::{println, *};
use crate::tools::fetch_listing;

#[derive(Debug, clap::Parser)]
#[command(name = "email")]
#[command(about = "Email operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List sent and received emails
    #[clap(name = "list")]
    List(ListOptions),

    /// Check whether an address is deliverable
    #[clap(name = "verify")]
    Verify(VerifyOptions),
}

#[derive(Debug, clap::Args)]
pub struct ListOptions {
    /// Only emails from this campaign
    #[arg(long)]
    campaign_id: Option<String>,

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

#[derive(Debug, clap::Args)]
pub struct VerifyOptions {
    /// Address to verify
    email: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Public data function - used by both CLI and MCP
pub async fn list_emails_data(
    client: &InstantlyClient,
    args: &ListEmailsArgs,
) -> Result<Value, ApiFailure> {
    let campaign_id = args.campaign_id.clone();

    fetch_listing(&args.page, move |params| {
        let mut query = params.to_query();
        if let Some(campaign_id) = &campaign_id {
            query.push(("campaign_id", campaign_id.clone()));
        }
        client.get("/emails", query)
    })
    .await
}

/// Public data function - used by both CLI and MCP
pub async fn verify_email_data(
    client: &InstantlyClient,
    args: &VerifyEmailArgs,
) -> Result<Value, ApiFailure> {
    client
        .post("/email-verification", json!({ "email": args.email }))
        .await
}

/// Module entry point
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::List(options) => list_handler(options, global).await,
        Commands::Verify(options) => verify_handler(options, global).await,
    }
}

async fn list_handler(options: ListOptions, global: crate::Global) -> Result<()> {
    let raw = json!({
        "campaign_id": options.campaign_id,
        "limit": options.limit,
        "starting_after": options.starting_after,
        "get_all": options.all,
    });

    let data = crate::tools::run_cli(&global, ToolName::ListEmails, raw).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    let items = listing_items(&data);
    println!("Found {} email(s):\n", items.len());
    if items.is_empty() {
        return Ok(());
    }

    print_items(
        items,
        &[
            ("Timestamp", "timestamp_email"),
            ("From", "from_address_email"),
            ("To", "to_address_email_list"),
            ("Subject", "subject"),
        ],
    );
    print_next_page_hint(&data, "email list");

    Ok(())
}

async fn verify_handler(options: VerifyOptions, global: crate::Global) -> Result<()> {
    let raw = json!({ "email": &options.email });
    let data = crate::tools::run_cli(&global, ToolName::VerifyEmail, raw).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        println!(
            "{}: {}",
            options.email,
            field(&data, "verification_status")
        );
    }

    Ok(())
}
