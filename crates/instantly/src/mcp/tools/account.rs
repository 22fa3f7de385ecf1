use super::{list_properties, object_schema, Tool};

pub fn definitions() -> Vec<Tool> {
    vec![Tool {
        name: "list_accounts".to_string(),
        description: "List the sending email accounts in the workspace. Call this before create_campaign: the email addresses it returns are the only valid values for a campaign's email_list. Supports cursor pagination via starting_after, or get_all to fetch every account.".to_string(),
        input_schema: object_schema(list_properties(), &[]),
    }]
}
