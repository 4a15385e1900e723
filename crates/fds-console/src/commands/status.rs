//! `fds status` command implementation
//!
//! One status fetch, reconciled and printed.

use super::Console;
use crate::error::Result;
use crate::poller;
use crate::render;

pub async fn run(console: &Console) -> Result<()> {
    poller::refresh_status(console.transport().as_ref(), console.view()).await?;
    print!("{}", render::render_status(&console.view().snapshot()));
    Ok(())
}
