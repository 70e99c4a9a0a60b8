use std::time::SystemTime;

use serde::Serialize;

/// Scheduler-level state of a process, reduced to the states the table shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessState {
    Running,
    Sleeping,
    Idle,
    Stopped,
    Zombie,
    Dead,
    DiskSleep,
    Other,
}

impl ProcessState {
    pub fn label(self) -> &'static str {
        match self {
            ProcessState::Running => "running",
            ProcessState::Sleeping => "sleeping",
            ProcessState::Idle => "idle",
            ProcessState::Stopped => "stopped",
            ProcessState::Zombie => "zombie",
            ProcessState::Dead => "dead",
            ProcessState::DiskSleep => "disk-sleep",
            ProcessState::Other => "other",
        }
    }
}

impl From<sysinfo::ProcessStatus> for ProcessState {
    fn from(status: sysinfo::ProcessStatus) -> Self {
        use sysinfo::ProcessStatus;

        match status {
            ProcessStatus::Run => ProcessState::Running,
            ProcessStatus::Sleep => ProcessState::Sleeping,
            ProcessStatus::Idle => ProcessState::Idle,
            ProcessStatus::Stop => ProcessState::Stopped,
            ProcessStatus::Zombie => ProcessState::Zombie,
            ProcessStatus::Dead => ProcessState::Dead,
            ProcessStatus::UninterruptibleDiskSleep => ProcessState::DiskSleep,
            _ => ProcessState::Other,
        }
    }
}

/// One row of a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    /// Percent of one logical CPU since the previous snapshot; may exceed 100.
    pub cpu_percent: f32,
    /// Resident bytes, or `None` when the OS would not say.
    pub memory_bytes: Option<u64>,
    pub status: ProcessState,
    pub thread_count: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SystemTotals {
    pub cpu_percent: f32,
    pub memory_used: u64,
    pub memory_total: u64,
}

impl SystemTotals {
    pub fn memory_percent(&self) -> f32 {
        if self.memory_total == 0 {
            return 0.0;
        }
        (self.memory_used as f64 / self.memory_total as f64 * 100.0) as f32
    }
}

/// An immutable enumeration of every observable process at one sampling tick.
///
/// Records are in enumeration order (ascending PID) and PIDs are unique. The
/// collection window is not atomic: each record existed at some instant during
/// the window, not necessarily all at once.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub taken_at: SystemTime,
    pub totals: SystemTotals,
    pub processes: Vec<ProcessRecord>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Snapshot {
            taken_at: SystemTime::now(),
            totals: SystemTotals::default(),
            processes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn pids(&self) -> impl Iterator<Item = u32> + '_ {
        self.processes.iter().map(|p| p.pid)
    }

    pub fn get(&self, pid: u32) -> Option<&ProcessRecord> {
        self.processes.iter().find(|p| p.pid == pid)
    }
}
