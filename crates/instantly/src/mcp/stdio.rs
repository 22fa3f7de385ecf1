//! Newline-delimited JSON-RPC over stdin/stdout

use crate::prelude::{eprintln, *};
use crate::tools::ToolContext;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

pub async fn run_stdio(ctx: ToolContext) -> Result<()> {
    if ctx.config.verbose {
        eprintln!("Starting Instantly MCP server on stdio...");
        eprintln!();
    }

    serve_lines(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), &ctx).await
}

/// Answer one JSON-RPC message per input line until EOF
///
/// Blank lines are skipped and notifications produce no output line.
async fn serve_lines<R, W>(mut reader: R, mut writer: W, ctx: &ToolContext) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let verbose = ctx.config.verbose;
    let mut line = String::new();
    let mut answered = 0usize;

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }

        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        if verbose {
            eprintln!("<- {message}");
        }

        let Some(response) = super::handle_request(message, ctx).await else {
            continue;
        };

        let mut encoded = serde_json::to_vec(&response)?;
        if verbose {
            eprintln!("-> {}", String::from_utf8_lossy(&encoded));
        }
        encoded.push(b'\n');

        writer.write_all(&encoded).await?;
        writer.flush().await?;
        answered += 1;
    }

    log::debug!("stdin closed after {answered} responses");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstantlyConfig;
    use serde_json::{json, Value};

    fn context() -> ToolContext {
        ToolContext::new(InstantlyConfig {
            api_key: Some("test-key".to_string()),
            base_url: "http://127.0.0.1:9/api/v2".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    async fn serve(input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        serve_lines(input.as_bytes(), &mut output, &context())
            .await
            .unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_one_response_line_per_request() {
        let responses = serve(concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        ))
        .await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], json!(1));
        assert_eq!(responses[1]["id"], json!(2));
        assert!(responses[1]["result"]["tools"].is_array());
    }

    #[tokio::test]
    async fn test_malformed_line_gets_parse_error() {
        let responses = serve("{not json\n").await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["error"]["code"], json!(-32700));
    }

    #[tokio::test]
    async fn test_last_line_without_newline_is_answered() {
        let responses = serve(r#"{"jsonrpc":"2.0","id":"a","method":"ping"}"#).await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], json!("a"));
    }
}
