use instantly_core::validation::CampaignStatus;
use serde_json::{json, Map, Value};

use super::{list_properties, object_schema, Tool};

fn campaign_id_schema(action: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "campaign_id": {
                "type": "string",
                "description": format!("ID of the campaign to {action}")
            }
        },
        "required": ["campaign_id"]
    })
}

fn create_campaign_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {
                "type": "string",
                "description": "Campaign name (1-255 characters)"
            },
            "subject": {
                "type": "string",
                "description": "Subject line of the first email (single line, max 255 characters). Supports variables like {{firstName}}."
            },
            "body": {
                "type": "string",
                "description": "Plain-text body. Use \\n for line breaks and \\n\\n between paragraphs; they are converted to <br /> and <p> markup. Only <p>, <br> and <br/> tags are allowed; do not send escaped quotes, tabs or carriage returns."
            },
            "message": {
                "type": "string",
                "description": "Shorthand for subject and body: the first sentence or line becomes the subject, the rest the body."
            },
            "email_list": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Sending account emails (1-100). Must be accounts returned by list_accounts."
            },
            "timezone": {
                "type": "string",
                "description": "Schedule timezone (default: America/Chicago). Common IANA names are mapped to the nearest zone the scheduler accepts."
            },
            "timing_from": {
                "type": "string",
                "description": "Start of the daily sending window, HH:MM 24-hour (default: 09:00)"
            },
            "timing_to": {
                "type": "string",
                "description": "End of the daily sending window, HH:MM 24-hour (default: 17:00)"
            },
            "days": {
                "type": "object",
                "description": "Sending days, e.g. {\"monday\": true, \"saturday\": false}. Unset days default to Monday-Friday.",
                "properties": {
                    "monday": { "type": "boolean" },
                    "tuesday": { "type": "boolean" },
                    "wednesday": { "type": "boolean" },
                    "thursday": { "type": "boolean" },
                    "friday": { "type": "boolean" },
                    "saturday": { "type": "boolean" },
                    "sunday": { "type": "boolean" }
                }
            },
            "daily_limit": {
                "type": "number",
                "description": "Emails per day per account (1-1000, default: 30)"
            },
            "email_gap_minutes": {
                "type": "number",
                "description": "Minutes between emails (1-1440, default: 10)"
            },
            "text_only": {
                "type": "boolean",
                "description": "Send plain text only"
            },
            "open_tracking": {
                "type": "boolean",
                "description": "Track opens (default: false)"
            },
            "link_tracking": {
                "type": "boolean",
                "description": "Track link clicks (default: false)"
            },
            "stop_on_reply": {
                "type": "boolean",
                "description": "Stop the sequence when a lead replies (default: true)"
            },
            "stop_on_auto_reply": {
                "type": "boolean",
                "description": "Stop the sequence on auto-replies (default: true)"
            },
            "sequence_steps": {
                "type": "number",
                "description": "Number of emails in the sequence (1-10, default: 1)"
            },
            "step_delay_days": {
                "type": "number",
                "description": "Days between sequence steps (1-30, default: 3)"
            },
            "sequence_bodies": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Body for each step; at least sequence_steps entries when given. Missing entries are generated as follow-ups."
            },
            "sequence_subjects": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Subject for each step; at least sequence_steps entries when given."
            },
            "campaign_schedule": {
                "type": "object",
                "description": "Advanced: full schedule object, sent as-is together with sequences"
            },
            "sequences": {
                "type": "array",
                "description": "Advanced: full sequences array, sent as-is together with campaign_schedule"
            }
        },
        "required": ["name", "email_list"]
    })
}

fn list_campaigns_schema() -> Value {
    let mut properties: Map<String, Value> = list_properties();
    properties.insert(
        "search".to_string(),
        json!({
            "type": "string",
            "description": "Filter campaigns by name"
        }),
    );
    properties.insert(
        "status".to_string(),
        json!({
            "type": "string",
            "description": "Filter by campaign status",
            "enum": CampaignStatus::NAMES
        }),
    );
    object_schema(properties, &[])
}

fn analytics_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "campaign_id": {
                "type": "string",
                "description": "Limit analytics to one campaign (default: all campaigns)"
            },
            "start_date": {
                "type": "string",
                "description": "First day of the range, YYYY-MM-DD"
            },
            "end_date": {
                "type": "string",
                "description": "Last day of the range, YYYY-MM-DD (not before start_date)"
            }
        },
        "required": []
    })
}

pub fn definitions() -> Vec<Tool> {
    vec![
        Tool {
            name: "create_campaign".to_string(),
            description: "Create an email campaign from a subject and body (or a message shorthand). Builds the schedule and sequence automatically, applies deliverability defaults (tracking off, 30 emails/day, Monday-Friday 09:00-17:00) and reports every default it applied. Call list_accounts first to get valid email_list values.".to_string(),
            input_schema: create_campaign_schema(),
        },
        Tool {
            name: "list_campaigns".to_string(),
            description: "List campaigns, optionally filtered by name or status. Supports cursor pagination via starting_after, or get_all to fetch every campaign.".to_string(),
            input_schema: list_campaigns_schema(),
        },
        Tool {
            name: "get_campaign".to_string(),
            description: "Get the full details of a campaign, including its schedule and sequences.".to_string(),
            input_schema: campaign_id_schema("fetch"),
        },
        Tool {
            name: "activate_campaign".to_string(),
            description: "Activate (start or resume sending) a campaign.".to_string(),
            input_schema: campaign_id_schema("activate"),
        },
        Tool {
            name: "pause_campaign".to_string(),
            description: "Pause a running campaign.".to_string(),
            input_schema: campaign_id_schema("pause"),
        },
        Tool {
            name: "get_campaign_analytics".to_string(),
            description: "Get sent, opened, replied and bounced counts for one or all campaigns, optionally within a date range.".to_string(),
            input_schema: analytics_schema(),
        },
    ]
}
