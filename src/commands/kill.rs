//! `sysdeck kill <pid>`: end a process picked from the `procs` view.

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::system_monitor::tasks::terminate_process;
use crate::ui;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let pid = matches
        .get_one::<u32>("pid")
        .copied()
        .context("A PID is required")?;

    terminate_process(pid).with_context(|| format!("Failed to terminate PID {}", pid))?;
    ui::success(&format!("Sent terminate signal to PID {}", pid));
    Ok(())
}
