//! Core library for instantly-mcp
//!
//! This crate implements the **Functional Core** of the instantly-mcp server,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`instantly_core`** (this crate): argument validation, smart defaults,
//!   payload construction, formatting and error mapping, all free of I/O
//! - **`instantly-mcp`**: HTTP client, configuration, CLI and MCP transports
//!
//! Every function here is deterministic and can be tested with fixture data;
//! the only async entry point, [`pagination::paginate_all`], awaits a fetcher
//! injected by the caller.
//!
//! # Module Organization
//!
//! - [`validation`]: per-tool argument checks producing typed arguments
//! - [`defaults`]: deliverability-oriented defaults for campaign requests
//! - [`campaign`]: campaign request model and the wire payload builder
//! - [`html`]: plain text to paragraph/break markup
//! - [`timezone`]: accepted timezones and nearest-match resolution
//! - [`pagination`]: the "fetch every page" driver
//! - [`errors`]: error taxonomy and upstream error mapping
//! - [`rate_limit`]: `x-ratelimit-*` header parsing
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use instantly_core::{campaign, defaults, timezone::TimezoneConfig, validation};
//! use serde_json::json;
//!
//! let timezones = TimezoneConfig::default();
//! let raw = json!({
//!     "name": "Promo",
//!     "subject": "Hi {{firstName}}",
//!     "body": "Line1\nLine2",
//!     "email_list": ["a@x.com"]
//! });
//!
//! let validation::ToolArgs::CreateCampaign(request) =
//!     validation::validate("create_campaign", &raw, &timezones)?
//! else {
//!     unreachable!()
//! };
//! let outcome = defaults::apply_defaults(&request, &timezones);
//! let payload = campaign::build_campaign_payload(&outcome.request, &timezones)?;
//!
//! assert_eq!(payload.steps().unwrap()[0].variants[0].body, "<p>Line1<br />Line2</p>");
//! ```

pub mod campaign;
pub mod defaults;
pub mod errors;
pub mod html;
pub mod pagination;
pub mod rate_limit;
pub mod timezone;
pub mod validation;
