//! Leads: listing is a `POST /leads/list` search, creation a `POST /leads`

use instantly_core::errors::ApiFailure;
use instantly_core::validation::{CreateLeadArgs, ListLeadsArgs, ToolName};
use serde::Serialize;
use serde_json::{json, Value};

use crate::client::InstantlyClient;
use crate::prelude::{println, *};
use crate::tools::fetch_listing;

#[derive(Debug, clap::Parser)]
#[command(name = "lead")]
#[command(about = "Lead operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List leads
    #[clap(name = "list")]
    List(ListOptions),

    /// Add a lead, optionally to a campaign
    #[clap(name = "create")]
    Create(CreateOptions),
}

#[derive(Debug, clap::Args)]
pub struct ListOptions {
    /// Only leads in this campaign
    #[arg(long)]
    campaign_id: Option<String>,

    /// Filter by name or email
    #[arg(long)]
    search: Option<String>,

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
pub struct CreateOptions {
    /// Lead email address
    email: String,

    /// Campaign to add the lead to
    #[arg(long)]
    campaign_id: Option<String>,

    #[arg(long)]
    first_name: Option<String>,

    #[arg(long)]
    last_name: Option<String>,

    #[arg(long)]
    company_name: Option<String>,

    /// Personalization line available to email templates
    #[arg(long)]
    personalization: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Body of `POST /leads`
#[derive(Debug, Serialize)]
struct NewLead<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    campaign: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    company_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    personalization: Option<&'a str>,
}

impl<'a> From<&'a CreateLeadArgs> for NewLead<'a> {
    fn from(args: &'a CreateLeadArgs) -> Self {
        Self {
            email: &args.email,
            campaign: args.campaign_id.as_deref(),
            first_name: args.first_name.as_deref(),
            last_name: args.last_name.as_deref(),
            company_name: args.company_name.as_deref(),
            personalization: args.personalization.as_deref(),
        }
    }
}

/// Public data function - used by both CLI and MCP
///
/// The leads listing is a POST with the page parameters in the body.
pub async fn list_leads_data(
    client: &InstantlyClient,
    args: &ListLeadsArgs,
) -> Result<Value, ApiFailure> {
    let campaign_id = args.campaign_id.clone();
    let search = args.search.clone();

    fetch_listing(&args.page, move |params| {
        let mut body = json!({ "limit": params.limit });
        if let Some(cursor) = params.starting_after {
            body["starting_after"] = json!(cursor);
        }
        if let Some(campaign_id) = &campaign_id {
            body["campaign"] = json!(campaign_id);
        }
        if let Some(search) = &search {
            body["search"] = json!(search);
        }
        client.post("/leads/list", body)
    })
    .await
}

/// Public data function - used by both CLI and MCP
pub async fn create_lead_data(
    client: &InstantlyClient,
    args: &CreateLeadArgs,
) -> Result<Value, ApiFailure> {
    let body = json!(NewLead::from(args));
    log::info!("Creating lead {}", args.email);
    client.post("/leads", body).await
}

/// Module entry point
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::List(options) => list_handler(options, global).await,
        Commands::Create(options) => create_handler(options, global).await,
    }
}

async fn list_handler(options: ListOptions, global: crate::Global) -> Result<()> {
    let raw = json!({
        "campaign_id": options.campaign_id,
        "search": options.search,
        "limit": options.limit,
        "starting_after": options.starting_after,
        "get_all": options.all,
    });

    let data = crate::tools::run_cli(&global, ToolName::ListLeads, raw).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    let items = listing_items(&data);
    println!("Found {} lead(s):\n", items.len());
    if items.is_empty() {
        return Ok(());
    }

    print_items(
        items,
        &[
            ("ID", "id"),
            ("Email", "email"),
            ("First Name", "first_name"),
            ("Last Name", "last_name"),
            ("Company", "company_name"),
        ],
    );
    print_next_page_hint(&data, "lead list");

    Ok(())
}

async fn create_handler(options: CreateOptions, global: crate::Global) -> Result<()> {
    let raw = json!({
        "email": options.email,
        "campaign_id": options.campaign_id,
        "first_name": options.first_name,
        "last_name": options.last_name,
        "company_name": options.company_name,
        "personalization": options.personalization,
    });

    let data = crate::tools::run_cli(&global, ToolName::CreateLead, raw).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        println!("Created lead {} ({})", field(&data, "email"), field(&data, "id"));
    }

    Ok(())
}
