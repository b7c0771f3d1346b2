//! Process list collector for the task manager view.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, Signal, System, UpdateKind, Users};

use crate::core::sampler::Collector;
use crate::core::system_monitor::ProcessRow;
use crate::error::{Result, SysdeckError};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Fallback owner for processes whose user cannot be resolved.
pub const UNKNOWN_USER: &str = "System";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessSort {
    #[default]
    Cpu,
    Memory,
}

impl std::str::FromStr for ProcessSort {
    type Err = SysdeckError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cpu" => Ok(ProcessSort::Cpu),
            "mem" | "memory" => Ok(ProcessSort::Memory),
            other => Err(SysdeckError::config(format!(
                "unknown process sort '{}' (expected cpu or mem)",
                other
            ))),
        }
    }
}

/// Collector for every running process, one row per PID.
///
/// Polling frequency: 2 seconds. The `System` instance keeps per-PID state
/// between cycles: dead PIDs are pruned on refresh and the previous cycle
/// serves as the CPU usage baseline.
pub struct ProcessCollector {
    system: System,
    users: Users,
    sort: ProcessSort,
    top: Option<usize>,
}

impl ProcessCollector {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            users: Users::new(),
            sort: ProcessSort::default(),
            top: None,
        }
    }

    /// Keep only the first `top` rows after sorting by `sort`.
    pub fn with_top(mut self, sort: ProcessSort, top: Option<usize>) -> Self {
        self.sort = sort;
        self.top = top;
        self
    }

    /// Reload the user list when some process is owned by a UID it lacks.
    ///
    /// Accounts created after startup would otherwise show as the fallback owner.
    fn refresh_users_on_miss(&mut self) -> bool {
        let users = &self.users;
        let missing = self
            .system
            .processes()
            .values()
            .filter_map(|proc| proc.user_id())
            .any(|uid| users.get_user_by_id(uid).is_none());

        if missing {
            self.users.refresh();
            log::debug!("user list reloaded ({} entries)", self.users.list().len());
        }
        missing
    }

    fn refresh(&mut self) -> usize {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_cpu()
                .with_memory()
                .with_user(UpdateKind::OnlyIfNotSet)
                .with_exe(UpdateKind::OnlyIfNotSet),
        )
    }
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for ProcessCollector {
    type Snapshot = Vec<ProcessRow>;

    fn name(&self) -> &str {
        "processes"
    }

    fn prime(&mut self) -> Result<()> {
        self.users.refresh();
        self.refresh();
        Ok(())
    }

    fn collect(&mut self) -> Result<Vec<ProcessRow>> {
        let refreshed = self.refresh();
        log::trace!("refreshed {} processes", refreshed);
        self.refresh_users_on_miss();

        let rows: Vec<ProcessRow> = self
            .system
            .processes()
            .values()
            .filter(|proc| proc.thread_kind().is_none())
            .map(|proc| {
                let user = proc
                    .user_id()
                    .and_then(|uid| self.users.get_user_by_id(uid))
                    .map(|user| user.name().to_string());

                process_row(
                    proc.pid().as_u32(),
                    &proc.name().to_string_lossy(),
                    user,
                    proc.memory(),
                    proc.cpu_usage(),
                    proc.exe(),
                )
            })
            .collect();

        Ok(sort_and_truncate(rows, self.sort, self.top))
    }
}

/// Ask a process to exit (SIGTERM where supported, a hard kill otherwise).
///
/// Returns once the signal is sent; the process may take a moment to go away.
pub fn terminate_process(pid: u32) -> Result<()> {
    let target = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[target]),
        true,
        ProcessRefreshKind::nothing(),
    );

    let process = system
        .process(target)
        .ok_or_else(|| SysdeckError::metric_collection(format!("no process with PID {}", pid)))?;

    let delivered = match process.kill_with(Signal::Term) {
        Some(sent) => sent,
        None => {
            log::debug!("SIGTERM unsupported here, killing PID {} outright", pid);
            process.kill()
        }
    };

    if delivered {
        log::info!("terminated PID {} ({})", pid, process.name().to_string_lossy());
        Ok(())
    } else {
        Err(SysdeckError::other(format!(
            "could not terminate PID {} (permission denied?)",
            pid
        )))
    }
}

pub(crate) fn process_row(
    pid: u32,
    name: &str,
    user: Option<String>,
    memory_bytes: u64,
    cpu_percent: f32,
    exe: Option<&Path>,
) -> ProcessRow {
    ProcessRow {
        pid,
        name: name.to_string(),
        user: user.unwrap_or_else(|| UNKNOWN_USER.to_string()),
        memory_mb: memory_bytes as f64 / BYTES_PER_MB,
        cpu_percent,
        exe_path: exe
            .map(|path| path.to_string_lossy().to_string())
            .unwrap_or_default(),
    }
}

/// Sort descending by the chosen key (PID ascending on ties), then truncate.
pub fn sort_and_truncate(
    mut rows: Vec<ProcessRow>,
    sort: ProcessSort,
    top: Option<usize>,
) -> Vec<ProcessRow> {
    rows.sort_by(|a, b| {
        let primary = match sort {
            ProcessSort::Cpu => b
                .cpu_percent
                .partial_cmp(&a.cpu_percent)
                .unwrap_or(Ordering::Equal),
            ProcessSort::Memory => b
                .memory_mb
                .partial_cmp(&a.memory_mb)
                .unwrap_or(Ordering::Equal),
        };
        primary.then(a.pid.cmp(&b.pid))
    });

    if let Some(n) = top {
        rows.truncate(n);
    }
    rows
}
