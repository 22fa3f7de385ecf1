mod account;
mod campaign;
mod email;
mod lead;

use instantly_core::validation::ToolName;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::prelude::{eprintln, *};
use crate::tools::ToolContext;

// Re-export types needed by tool definitions
pub use super::{JsonRpcError, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

pub fn handle_initialize() -> Result<Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "instantly-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

/// Every tool definition, in [`ToolName::ALL`] order
fn definitions() -> Vec<Tool> {
    let mut tools = Vec::with_capacity(ToolName::ALL.len());
    tools.extend(account::definitions());
    tools.extend(campaign::definitions());
    tools.extend(lead::definitions());
    tools.extend(email::definitions());

    tools.sort_by_key(|tool| {
        ToolName::ALL
            .iter()
            .position(|name| name.as_str() == tool.name)
            .unwrap_or(usize::MAX)
    });
    tools
}

pub fn handle_tools_list() -> Result<Value, JsonRpcError> {
    let result = ToolsList {
        tools: definitions(),
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

pub async fn handle_tools_call(
    params: Option<Value>,
    ctx: &ToolContext,
) -> Result<Value, JsonRpcError> {
    let params: CallToolParams =
        serde_json::from_value(params.unwrap_or(Value::Null)).map_err(|e| JsonRpcError {
            code: -32602,
            message: format!("Invalid params: {e}"),
            data: None,
        })?;

    let Some(tool) = ToolName::parse(&params.name) else {
        return Err(JsonRpcError {
            code: -32602,
            message: format!("Unknown tool: {}", params.name),
            data: None,
        });
    };

    let arguments = params.arguments.unwrap_or(Value::Null);
    let data = crate::tools::execute(ctx, tool, &arguments).await;

    if ctx.config.verbose {
        match &data {
            Ok(_) => eprintln!("{tool} succeeded"),
            Err(err) => eprintln!("{tool} failed: {err}"),
        }
    }

    let data = data?;

    // Convert to JSON and wrap in MCP result format
    let json_string = serde_json::to_string_pretty(&data)
        .map_err(|e| JsonRpcError::internal(format!("Serialization error: {e}")))?;

    let result = CallToolResult {
        content: vec![Content::Text { text: json_string }],
        is_error: None,
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

/// Shared `limit` / `starting_after` / `get_all` properties of list tools
fn list_properties() -> Map<String, Value> {
    let properties = json!({
        "limit": {
            "type": "number",
            "description": "Items per page (1-100, default: 100)"
        },
        "starting_after": {
            "type": "string",
            "description": "Cursor from next_starting_after of the previous page"
        },
        "get_all": {
            "type": "boolean",
            "description": "Fetch every page (up to 20 pages of 100) instead of a single page (default: false)"
        }
    });

    match properties {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Object schema from a property map and required keys
fn object_schema(properties: Map<String, Value>, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tool_has_one_definition() {
        let tools = definitions();
        let names: Vec<&str> = tools.iter().map(|tool| tool.name.as_str()).collect();
        let expected: Vec<&str> = ToolName::ALL.iter().map(|tool| tool.as_str()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_schemas_are_objects() {
        for tool in definitions() {
            assert_eq!(tool.input_schema["type"], json!("object"), "{}", tool.name);
            assert!(tool.input_schema["properties"].is_object(), "{}", tool.name);
            assert!(!tool.description.is_empty());
        }
    }

    #[test]
    fn test_tool_error_keeps_kind_code() {
        let err: JsonRpcError =
            instantly_core::errors::ToolError::internal("temporary outage").into();
        assert_eq!(err.code, -32603);
        assert_eq!(err.message, "temporary outage");
    }
}
