//! `fds logs` command implementation

use super::Console;
use crate::error::Result;
use crate::poller;
use crate::render;

/// Print the newest `limit` log lines (configured limit when `None`).
pub async fn run(console: &Console, limit: Option<u32>) -> Result<()> {
    let limit = limit.unwrap_or(console.config.log_limit);
    poller::refresh_logs(console.transport().as_ref(), console.view(), limit).await?;
    print!("{}", render::render_logs(&console.view().snapshot().logs));
    Ok(())
}
