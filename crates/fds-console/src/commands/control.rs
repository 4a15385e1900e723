//! Loop control commands: `discover`, `start`, `pause`, `resume`, `retry`, `reset`
//!
//! Each one posts a single command through the dispatcher, prints the
//! server's message and the controls as they stand afterwards.

use super::Console;
use crate::dispatcher::CommandOutcome;
use crate::error::Result;
use crate::render;
use colored::Colorize;

fn report(console: &Console, outcome: &CommandOutcome) {
    print!("{}", render::render_outcome(outcome));
    let state = console.view().snapshot();
    if outcome.refreshed.status {
        print!("{}", render::render_indicator(&state.controls));
    }
    println!("{}", render::render_controls(&state));
}

pub async fn discover(console: &Console, toc_url: &str) -> Result<()> {
    let outcome = console.dispatcher.discover(toc_url).await?;
    report(console, &outcome);
    if outcome.count.is_some() {
        println!("Run {} to ingest them.", "fds start".cyan());
    }
    Ok(())
}

pub async fn start(console: &Console) -> Result<()> {
    let outcome = console.dispatcher.start().await?;
    report(console, &outcome);
    Ok(())
}

pub async fn pause(console: &Console) -> Result<()> {
    let outcome = console.dispatcher.pause().await?;
    report(console, &outcome);
    Ok(())
}

pub async fn resume(console: &Console) -> Result<()> {
    let outcome = console.dispatcher.resume().await?;
    report(console, &outcome);
    Ok(())
}

pub async fn retry(console: &Console) -> Result<()> {
    let outcome = console.dispatcher.retry_failed().await?;
    report(console, &outcome);
    Ok(())
}

pub async fn reset(console: &Console) -> Result<()> {
    let outcome = console.dispatcher.reset().await?;
    report(console, &outcome);
    Ok(())
}
