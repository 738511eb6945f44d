//! Serve Command
//!
//! Run the HTTP API.
//!
//! Usage:
//!   jobquote serve [--bind 0.0.0.0:8080]

use crate::cli::CommandContext;
use crate::server;
use crate::types::Result;

pub async fn run(bind: Option<String>) -> Result<()> {
    let mut ctx = CommandContext::load()?;
    if let Some(bind) = bind {
        ctx.config.server.bind = bind;
    }

    server::serve(&ctx.config, ctx.credentials.clone()).await
}
