#[derive(Debug, clap::Parser)]
#[command(name = "mcp")]
#[command(about = "Serve the Instantly tools over the Model Context Protocol")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Serve newline-delimited JSON-RPC on stdin/stdout (for desktop MCP clients)
    #[clap(name = "stdio")]
    Stdio,

    /// Serve over HTTP: GET /sse for the event stream, POST /message for requests
    #[clap(name = "sse")]
    Sse(SseOptions),
}

#[derive(Debug, clap::Args)]
pub struct SseOptions {
    /// Port to listen on
    #[arg(short, long, env = "INSTANTLY_MCP_PORT", default_value = "3000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "INSTANTLY_MCP_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Seconds between keep-alive comments on idle streams
    #[arg(long, env = "INSTANTLY_MCP_KEEP_ALIVE", default_value = "15",
          value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub keep_alive_secs: u64,
}
