//! `fds watch` command implementation
//!
//! Starts the poller and redraws the dashboard whenever the view changes.
//! Ctrl-C stops the poller and leaves the last frame on screen.

use super::Console;
use crate::error::Result;
use crate::poller::{PollSettings, Poller};
use crate::render;
use console::Term;
use tracing::{debug, info};

pub async fn run(console: &Console) -> Result<()> {
    let term = Term::stdout();
    let view = console.view().clone();
    let mut changes = view.subscribe();

    let mut poller = Poller::new(
        console.transport().clone(),
        view.clone(),
        PollSettings::from(&console.config),
    );
    poller.start();
    info!(server_url = %console.config.server_url(), "Watching ingestion server");

    draw(&term, console)?;
    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                draw(&term, console)?;
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                break;
            }
        }
    }

    poller.stop();
    Ok(())
}

fn draw(term: &Term, console: &Console) -> Result<()> {
    let frame = render::render_dashboard(&console.view().snapshot(), console.config.server_url());
    if term.is_term() {
        term.clear_screen()?;
    }
    term.write_str(&frame)?;
    Ok(())
}
