use serde_json::json;

use super::{list_properties, object_schema, Tool};

pub fn definitions() -> Vec<Tool> {
    let mut list_properties = list_properties();
    list_properties.insert(
        "campaign_id".to_string(),
        json!({
            "type": "string",
            "description": "Only leads in this campaign"
        }),
    );
    list_properties.insert(
        "search".to_string(),
        json!({
            "type": "string",
            "description": "Filter by name or email"
        }),
    );

    vec![
        Tool {
            name: "list_leads".to_string(),
            description: "List leads, optionally within a campaign. Supports cursor pagination via starting_after, or get_all to fetch every lead.".to_string(),
            input_schema: object_schema(list_properties, &[]),
        },
        Tool {
            name: "create_lead".to_string(),
            description: "Create a lead, optionally adding it to a campaign.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "email": {
                        "type": "string",
                        "description": "Lead email address"
                    },
                    "campaign_id": {
                        "type": "string",
                        "description": "Campaign to add the lead to"
                    },
                    "first_name": { "type": "string" },
                    "last_name": { "type": "string" },
                    "company_name": { "type": "string" },
                    "personalization": {
                        "type": "string",
                        "description": "Personalization line available to email templates"
                    }
                },
                "required": ["email"]
            }),
        },
    ]
}
