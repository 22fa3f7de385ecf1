use serde_json::json;

use super::{list_properties, object_schema, Tool};

pub fn definitions() -> Vec<Tool> {
    let mut list_properties = list_properties();
    list_properties.insert(
        "campaign_id".to_string(),
        json!({
            "type": "string",
            "description": "Only emails from this campaign"
        }),
    );

    vec![
        Tool {
            name: "list_emails".to_string(),
            description: "List sent and received emails, optionally for one campaign. Supports cursor pagination via starting_after, or get_all to fetch every email.".to_string(),
            input_schema: object_schema(list_properties, &[]),
        },
        Tool {
            name: "verify_email".to_string(),
            description: "Check whether an email address is deliverable. Requires a plan that includes email verification.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "email": {
                        "type": "string",
                        "description": "Address to verify"
                    }
                },
                "required": ["email"]
            }),
        },
    ]
}
