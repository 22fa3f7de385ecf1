//! Tool execution shared by the CLI and the MCP server
//!
//! Every tool runs the same pipeline: validate the raw arguments, call the
//! domain data function, and translate any upstream failure with
//! [`map_error`].

use std::future::Future;

use instantly_core::errors::{map_error, ApiFailure, ToolError};
use instantly_core::pagination::{
    paginate_all, PageParams, PageResponse, PaginateOptions, DEFAULT_PAGE_LIMIT, NEXT_CURSOR_FIELD,
};
use instantly_core::rate_limit::RateLimitInfo;
use instantly_core::validation::{validate, ListArgs, ToolArgs, ToolName};
use serde_json::{json, Value};

use crate::client::InstantlyClient;
use crate::config::InstantlyConfig;
use crate::prelude::{eprintln, *};

/// Everything a tool call needs
#[derive(Debug)]
pub struct ToolContext {
    pub config: InstantlyConfig,
    pub client: InstantlyClient,
}

impl ToolContext {
    pub fn new(config: InstantlyConfig) -> Result<Self> {
        let client = InstantlyClient::new(&config)?;
        Ok(Self { config, client })
    }

    pub fn from_global(global: &crate::Global) -> Result<Self> {
        Self::new(InstantlyConfig::from_global(global)?)
    }
}

/// Validate and run one tool
pub async fn execute(ctx: &ToolContext, tool: ToolName, raw: &Value) -> Result<Value, ToolError> {
    let args = validate(tool.as_str(), raw, &ctx.config.timezones)?;

    if ctx.config.verbose {
        eprintln!("Calling {tool}: {args:?}");
    }

    let client = &ctx.client;
    let result = match args {
        ToolArgs::ListAccounts(page) => crate::account::list_accounts_data(client, &page).await,
        ToolArgs::CreateCampaign(request) => {
            crate::campaign::create_campaign_data(client, &request, &ctx.config.timezones).await
        }
        ToolArgs::ListCampaigns(list) => crate::campaign::list_campaigns_data(client, &list).await,
        ToolArgs::GetCampaign(id) => crate::campaign::get_campaign_data(client, &id).await,
        ToolArgs::ActivateCampaign(id) => {
            crate::campaign::activate_campaign_data(client, &id).await
        }
        ToolArgs::PauseCampaign(id) => crate::campaign::pause_campaign_data(client, &id).await,
        ToolArgs::GetCampaignAnalytics(analytics) => {
            crate::campaign::campaign_analytics_data(client, &analytics).await
        }
        ToolArgs::ListLeads(list) => crate::lead::list_leads_data(client, &list).await,
        ToolArgs::CreateLead(lead) => crate::lead::create_lead_data(client, &lead).await,
        ToolArgs::ListEmails(list) => crate::email::list_emails_data(client, &list).await,
        ToolArgs::VerifyEmail(verify) => crate::email::verify_email_data(client, &verify).await,
    };

    let rate_limit = ctx.client.rate_limit();
    if ctx.config.verbose {
        if let Some(info) = &rate_limit {
            eprintln!("Rate limit after {tool}: {info}");
        }
    }

    result.map_err(|failure| {
        let throttled = matches!(failure, ApiFailure::Upstream { status: 429, .. });
        let mut err = map_error(failure, tool.as_str());
        if throttled {
            err = with_reset_hint(err, rate_limit);
        }
        log::debug!("{tool} failed: {err}");
        err
    })
}

/// Tell a throttled caller when the quota comes back, if the API said so
fn with_reset_hint(err: ToolError, rate_limit: Option<RateLimitInfo>) -> ToolError {
    match rate_limit.and_then(|info| info.reset) {
        Some(reset) => ToolError {
            message: format!("{} The quota resets at {}.", err.message, reset.to_rfc3339()),
            ..err
        },
        None => err,
    }
}

/// Run a tool for a CLI command, with arguments built from its flags
pub async fn run_cli(global: &crate::Global, tool: ToolName, raw: Value) -> Result<Value> {
    let ctx = ToolContext::from_global(global)?;
    let data = execute(&ctx, tool, &raw).await.map_err(Error::Tool)?;
    Ok(data)
}

/// Fetch one page of a listing, or every page when `get_all` is set
///
/// Single pages come back as `{ items, next_starting_after }`; full walks as
/// `{ items, total }`.
pub async fn fetch_listing<F, Fut>(page: &ListArgs, fetch: F) -> Result<Value, ApiFailure>
where
    F: FnMut(PageParams) -> Fut,
    Fut: Future<Output = Result<Value, ApiFailure>>,
{
    let params = PageParams {
        limit: Some(page.limit.unwrap_or(DEFAULT_PAGE_LIMIT)),
        starting_after: page.starting_after.clone(),
        offset: None,
    };

    if page.get_all {
        let items = paginate_all(fetch, params, &PaginateOptions::default()).await?;
        let total = items.len();
        return Ok(json!({ "items": items, "total": total }));
    }

    let mut fetch = fetch;
    let response = fetch(params).await?;

    match PageResponse::from_value(response.clone()).into_parts() {
        Some((items, next_cursor)) => Ok(json!({
            "items": items,
            NEXT_CURSOR_FIELD: next_cursor,
        })),
        None => Ok(response),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_single_page_keeps_cursor() {
        let page = ListArgs {
            limit: Some(2),
            ..Default::default()
        };

        let result = fetch_listing(&page, |params: PageParams| async move {
            assert_eq!(params.limit, Some(2));
            Ok(json!({ "items": [{"id": 1}, {"id": 2}], "next_starting_after": "2" }))
        })
        .await
        .unwrap();

        assert_eq!(
            result,
            json!({ "items": [{"id": 1}, {"id": 2}], "next_starting_after": "2" })
        );
    }

    #[tokio::test]
    async fn test_get_all_walks_pages() {
        let page = ListArgs {
            get_all: true,
            ..Default::default()
        };

        let result = fetch_listing(&page, |params: PageParams| async move {
            Ok(match params.starting_after.as_deref() {
                None => json!({ "items": [{"id": 1}], "next_starting_after": "1" }),
                _ => json!({ "items": [{"id": 2}] }),
            })
        })
        .await
        .unwrap();

        assert_eq!(result["total"], json!(2));
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let err = fetch_listing(&ListArgs::default(), |_params: PageParams| async {
            Err(ApiFailure::Upstream {
                status: 401,
                message: "Unauthorized".to_string(),
                details: None,
            })
        })
        .await
        .unwrap_err();

        let mapped = map_error(err, "list_accounts");
        assert!(mapped.message.contains("INSTANTLY_API_KEY"));
    }

    #[test]
    fn test_throttled_error_names_reset_time() {
        let throttled = map_error(
            ApiFailure::Upstream {
                status: 429,
                message: "Too Many Requests".to_string(),
                details: None,
            },
            "list_leads",
        );
        let info = RateLimitInfo::from_headers([
            ("x-ratelimit-limit", "100"),
            ("x-ratelimit-remaining", "0"),
            ("x-ratelimit-reset", "1767225600"),
        ]);

        let err = with_reset_hint(throttled.clone(), info);
        assert!(err.message.starts_with(&throttled.message));
        assert!(err.message.ends_with("The quota resets at 2026-01-01T00:00:00+00:00."));
        assert_eq!(err.kind, throttled.kind);

        assert_eq!(with_reset_hint(throttled.clone(), None), throttled);
    }
}
