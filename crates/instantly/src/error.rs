use instantly_core::errors::ToolError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("INSTANTLY_API_KEY is not set; pass --api-key or export INSTANTLY_API_KEY")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Tool(#[from] ToolError),
}
