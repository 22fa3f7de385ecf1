//! Campaign commands and data functions
//!
//! `create` and `preview` share one pipeline: validate the arguments, apply
//! the smart defaults, then build the upstream payload. `preview` stops there
//! and never touches the network.

use std::path::{Path, PathBuf};

use instantly_core::campaign::{build_campaign_payload, CampaignPayload, CampaignRequest};
use instantly_core::defaults::apply_defaults;
use instantly_core::errors::{ApiFailure, BuildError, ToolError};
use instantly_core::timezone::TimezoneConfig;
use instantly_core::validation::{
    validate, AnalyticsArgs, CampaignIdArgs, CampaignStatus, ListCampaignsArgs, ToolArgs,
    ToolName,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::client::InstantlyClient;
use crate::config::InstantlyConfig;
use crate::prelude::{eprintln, println, *};
use crate::tools::fetch_listing;

#[derive(Debug, clap::Parser)]
#[command(name = "campaign")]
#[command(about = "Campaign operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Build the campaign payload locally without calling the API
    #[clap(name = "preview")]
    Preview(CampaignOptions),

    /// Create a campaign
    #[clap(name = "create")]
    Create(CampaignOptions),

    /// List campaigns
    #[clap(name = "list")]
    List(ListOptions),

    /// Show a single campaign
    #[clap(name = "get")]
    Get(IdOptions),

    /// Start sending a campaign
    #[clap(name = "activate")]
    Activate(IdOptions),

    /// Stop sending a campaign
    #[clap(name = "pause")]
    Pause(IdOptions),

    /// Campaign analytics for a date range
    #[clap(name = "analytics")]
    Analytics(AnalyticsOptions),
}

/// Campaign arguments from a JSON file, flags, or both (flags win)
#[derive(Debug, clap::Args)]
#[command(after_help = "EXAMPLES:
  # Preview the payload for a two-step sequence:
  instantly-mcp campaign preview --name Promo --subject 'Hi {{firstName}}' \\
    --body $'Line1\\nLine2' --from sender@example.com --sequence-steps 2

  # Create a campaign from a JSON file of create_campaign arguments:
  instantly-mcp campaign create --file campaign.json")]
pub struct CampaignOptions {
    /// JSON file with create_campaign arguments ("-" reads stdin)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Campaign name
    #[arg(long)]
    name: Option<String>,

    /// Subject line of the first email
    #[arg(long)]
    subject: Option<String>,

    /// Plain-text body of the first email
    #[arg(long)]
    body: Option<String>,

    /// Subject and body in one text: the first sentence becomes the subject
    #[arg(long)]
    message: Option<String>,

    /// Sending account email (repeatable)
    #[arg(long = "from", value_name = "EMAIL")]
    email_list: Vec<String>,

    /// Timezone for the sending schedule
    #[arg(long)]
    timezone: Option<String>,

    /// Start of the sending window (HH:MM)
    #[arg(long)]
    timing_from: Option<String>,

    /// End of the sending window (HH:MM)
    #[arg(long)]
    timing_to: Option<String>,

    /// Emails per day per sending account
    #[arg(long)]
    daily_limit: Option<u32>,

    /// Number of emails in the sequence
    #[arg(long)]
    sequence_steps: Option<u32>,

    /// Days to wait between sequence steps
    #[arg(long)]
    step_delay_days: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl CampaignOptions {
    /// Merge the file (if any) with the flags into create_campaign arguments
    fn arguments(&self) -> Result<Value> {
        let mut args = match &self.file {
            Some(path) => read_arguments(path)?,
            None => Map::new(),
        };

        let strings = [
            ("name", &self.name),
            ("subject", &self.subject),
            ("body", &self.body),
            ("message", &self.message),
            ("timezone", &self.timezone),
            ("timing_from", &self.timing_from),
            ("timing_to", &self.timing_to),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                args.insert(key.to_string(), json!(value));
            }
        }

        let numbers = [
            ("daily_limit", self.daily_limit),
            ("sequence_steps", self.sequence_steps),
            ("step_delay_days", self.step_delay_days),
        ];
        for (key, value) in numbers {
            if let Some(value) = value {
                args.insert(key.to_string(), json!(value));
            }
        }

        if !self.email_list.is_empty() {
            args.insert("email_list".to_string(), json!(self.email_list));
        }

        Ok(Value::Object(args))
    }
}

fn read_arguments(path: &Path) -> Result<Map<String, Value>> {
    let text = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("Failed to read arguments from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    match serde_json::from_str::<Value>(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => Err(eyre!("{} must contain a JSON object", path.display())),
    }
}

#[derive(Debug, clap::Args)]
pub struct ListOptions {
    /// Filter by campaign name
    #[arg(long)]
    search: Option<String>,

    /// Filter by status (draft, active, paused, completed, running_subsequences)
    #[arg(long)]
    status: Option<String>,

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
pub struct IdOptions {
    /// Campaign ID
    campaign_id: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, clap::Args)]
pub struct AnalyticsOptions {
    /// Limit to a single campaign
    #[arg(long)]
    campaign_id: Option<String>,

    /// First day of the range (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<String>,

    /// Last day of the range (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Defaulted payload ready to send, plus what was defaulted
#[derive(Debug, Clone, Serialize)]
pub struct PreparedCampaign {
    pub payload: CampaignPayload,
    pub defaults_applied: Vec<String>,
}

/// Apply smart defaults and build the upstream payload
pub fn prepare_campaign(
    request: &CampaignRequest,
    timezones: &TimezoneConfig,
) -> Result<PreparedCampaign, BuildError> {
    let outcome = apply_defaults(request, timezones);
    let payload = build_campaign_payload(&outcome.request, timezones)?;

    Ok(PreparedCampaign {
        payload,
        defaults_applied: outcome.applied,
    })
}

/// Public data function - used by both CLI and MCP
pub async fn create_campaign_data(
    client: &InstantlyClient,
    request: &CampaignRequest,
    timezones: &TimezoneConfig,
) -> Result<Value, ApiFailure> {
    let prepared = prepare_campaign(request, timezones).map_err(ToolError::from)?;

    log::info!(
        "Creating campaign '{}' ({} defaults applied)",
        prepared.payload.name,
        prepared.defaults_applied.len()
    );

    let body = serde_json::to_value(&prepared.payload).map_err(|e| {
        ToolError::internal(format!("Failed to serialize campaign payload: {e}"))
    })?;

    let campaign = client.post("/campaigns", body).await?;

    Ok(json!({
        "campaign": campaign,
        "defaults_applied": prepared.defaults_applied,
    }))
}

/// Public data function - used by both CLI and MCP
pub async fn list_campaigns_data(
    client: &InstantlyClient,
    args: &ListCampaignsArgs,
) -> Result<Value, ApiFailure> {
    let search = args.search.clone();
    let status = args.status.map(CampaignStatus::code);

    fetch_listing(&args.page, move |params| {
        let mut query = params.to_query();
        if let Some(search) = &search {
            query.push(("search", search.clone()));
        }
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        client.get("/campaigns", query)
    })
    .await
}

/// Public data function - used by both CLI and MCP
pub async fn get_campaign_data(
    client: &InstantlyClient,
    args: &CampaignIdArgs,
) -> Result<Value, ApiFailure> {
    client
        .get(&format!("/campaigns/{}", args.campaign_id), Vec::new())
        .await
}

/// Public data function - used by both CLI and MCP
pub async fn activate_campaign_data(
    client: &InstantlyClient,
    args: &CampaignIdArgs,
) -> Result<Value, ApiFailure> {
    log::info!("Activating campaign {}", args.campaign_id);
    client
        .post(&format!("/campaigns/{}/activate", args.campaign_id), json!({}))
        .await
}

/// Public data function - used by both CLI and MCP
pub async fn pause_campaign_data(
    client: &InstantlyClient,
    args: &CampaignIdArgs,
) -> Result<Value, ApiFailure> {
    log::info!("Pausing campaign {}", args.campaign_id);
    client
        .post(&format!("/campaigns/{}/pause", args.campaign_id), json!({}))
        .await
}

/// Public data function - used by both CLI and MCP
pub async fn campaign_analytics_data(
    client: &InstantlyClient,
    args: &AnalyticsArgs,
) -> Result<Value, ApiFailure> {
    let mut query = Vec::new();
    if let Some(id) = &args.campaign_id {
        query.push(("id", id.clone()));
    }
    if let Some(start) = args.start_date {
        query.push(("start_date", start.format("%Y-%m-%d").to_string()));
    }
    if let Some(end) = args.end_date {
        query.push(("end_date", end.format("%Y-%m-%d").to_string()));
    }

    client.get("/campaigns/analytics", query).await
}

/// Module entry point
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::Preview(options) => preview_handler(options, global),
        Commands::Create(options) => create_handler(options, global).await,
        Commands::List(options) => list_handler(options, global).await,
        Commands::Get(options) => id_handler(ToolName::GetCampaign, options, global).await,
        Commands::Activate(options) => {
            id_handler(ToolName::ActivateCampaign, options, global).await
        }
        Commands::Pause(options) => id_handler(ToolName::PauseCampaign, options, global).await,
        Commands::Analytics(options) => analytics_handler(options, global).await,
    }
}

fn preview_handler(options: CampaignOptions, global: crate::Global) -> Result<()> {
    let config = InstantlyConfig::from_global(&global)?;
    let raw = options.arguments()?;

    let args = validate(ToolName::CreateCampaign.as_str(), &raw, &config.timezones)
        .map_err(|e| Error::Tool(e.into()))?;
    let ToolArgs::CreateCampaign(request) = args else {
        return Err(eyre!("Unexpected arguments for create_campaign"));
    };

    let prepared = prepare_campaign(&request, &config.timezones)
        .map_err(|e| Error::Tool(e.into()))?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&prepared)?);
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&prepared.payload)?);
    print_defaults(&prepared.defaults_applied);

    Ok(())
}

async fn create_handler(options: CampaignOptions, global: crate::Global) -> Result<()> {
    let raw = options.arguments()?;
    let data = crate::tools::run_cli(&global, ToolName::CreateCampaign, raw).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    let campaign = &data["campaign"];
    println!(
        "Created campaign {} ({})",
        field(campaign, "name"),
        field(campaign, "id")
    );

    let defaults: Vec<String> = data["defaults_applied"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    print_defaults(&defaults);

    Ok(())
}

fn print_defaults(defaults: &[String]) {
    if defaults.is_empty() {
        return;
    }
    eprintln!("\nDefaults applied:");
    for default in defaults {
        eprintln!("  - {default}");
    }
}

async fn list_handler(options: ListOptions, global: crate::Global) -> Result<()> {
    let raw = json!({
        "search": options.search,
        "status": options.status,
        "limit": options.limit,
        "starting_after": options.starting_after,
        "get_all": options.all,
    });

    let data = crate::tools::run_cli(&global, ToolName::ListCampaigns, raw).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    let items: Vec<Value> = listing_items(&data)
        .iter()
        .cloned()
        .map(with_status_name)
        .collect();

    println!("Found {} campaign(s):\n", items.len());
    if items.is_empty() {
        return Ok(());
    }

    print_items(&items, &[("ID", "id"), ("Name", "name"), ("Status", "status")]);
    print_next_page_hint(&data, "campaign list");

    Ok(())
}

/// Replace the numeric status code with its name for display
fn with_status_name(mut item: Value) -> Value {
    let name = item
        .get("status")
        .and_then(Value::as_i64)
        .and_then(CampaignStatus::from_code)
        .map(CampaignStatus::as_str);

    if let (Some(name), Some(object)) = (name, item.as_object_mut()) {
        object.insert("status".to_string(), json!(name));
    }
    item
}

async fn id_handler(tool: ToolName, options: IdOptions, global: crate::Global) -> Result<()> {
    let raw = json!({ "campaign_id": &options.campaign_id });
    let data = crate::tools::run_cli(&global, tool, raw).await?;

    if options.json || tool == ToolName::GetCampaign {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    let verb = match tool {
        ToolName::ActivateCampaign => "Activated",
        _ => "Paused",
    };
    println!("{verb} campaign {}", options.campaign_id);

    Ok(())
}

async fn analytics_handler(options: AnalyticsOptions, global: crate::Global) -> Result<()> {
    let raw = json!({
        "campaign_id": options.campaign_id,
        "start_date": options.start_date,
        "end_date": options.end_date,
    });

    let data = crate::tools::run_cli(&global, ToolName::GetCampaignAnalytics, raw).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    let items = listing_items(&data);
    if items.is_empty() {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    print_items(
        items,
        &[
            ("Campaign", "campaign_name"),
            ("Leads", "leads_count"),
            ("Contacted", "contacted_count"),
            ("Sent", "emails_sent_count"),
            ("Opens", "open_count"),
            ("Replies", "reply_count"),
            ("Bounced", "bounced_count"),
        ],
    );

    Ok(())
}
