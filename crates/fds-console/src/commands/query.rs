//! `fds query` command implementation
//!
//! The SQL goes to the server as-is; only an empty statement is refused
//! locally.

use super::Console;
use crate::error::Result;
use crate::query::{format_result, QueryFormat, QueryRunner};
use tracing::info;

pub async fn run(console: &Console, sql: &str, format: &str) -> Result<()> {
    let format: QueryFormat = format.parse()?;
    info!(?format, "Running query command");

    let runner = QueryRunner::new(console.transport().clone(), console.view().clone());
    let result = runner.run(sql).await?;
    print!("{}", format_result(&result, format)?);
    Ok(())
}
