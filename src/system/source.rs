use std::collections::HashMap;
use std::io;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use thiserror::Error;

use super::platform;
use super::record::{ProcessState, SystemTotals};

/// Failure to list the process table at all. Surfaced to the caller.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("cannot list processes: {0}")]
    Enumeration(#[from] io::Error),
    #[error("process table is empty")]
    EmptyProcessTable,
}

/// Why a single process could not be read. The sampler drops the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("process exited")]
    Vanished,
    #[error("access denied")]
    AccessDenied,
    #[error("zombie process without readable details")]
    Zombie,
    #[error("unreadable: {0}")]
    Unreadable(String),
}

impl From<io::Error> for ProbeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ProbeError::Vanished,
            io::ErrorKind::PermissionDenied => ProbeError::AccessDenied,
            _ => ProbeError::Unreadable(err.to_string()),
        }
    }
}

/// Metrics projection for one process as read during a refresh.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessProbe {
    pub name: String,
    /// Seconds since the epoch; pairs with the PID to identify a process.
    pub start_time: u64,
    pub cpu_percent: f32,
    pub memory_bytes: Option<u64>,
    pub status: ProcessState,
    pub thread_count: u32,
}

/// OS process-introspection capability the sampler is built on.
pub trait ProcessSource {
    /// Re-reads the OS process table and returns the live PIDs in enumeration order.
    fn refresh(&mut self) -> Result<Vec<u32>, SampleError>;

    /// Reads the projection for one PID from the last refresh.
    fn probe(&self, pid: u32) -> Result<ProcessProbe, ProbeError>;

    /// System-wide CPU and memory as of the last refresh.
    fn totals(&self) -> SystemTotals;
}

pub struct SysinfoSource {
    sys: System,
    thread_counts: HashMap<u32, u32>,
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoSource {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_usage();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::everything(),
        );
        SysinfoSource {
            sys,
            thread_counts: HashMap::new(),
        }
    }
}

impl ProcessSource for SysinfoSource {
    fn refresh(&mut self) -> Result<Vec<u32>, SampleError> {
        let _refresh_span = tracing::debug_span!("source.refresh").entered();

        platform::check_process_table()?;

        self.sys.refresh_memory();
        self.sys.refresh_cpu_usage();
        // Memory and CPU are the only per-process fields that change tick to tick.
        // Tasks carry the thread counts, so probing needs no further OS reads.
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_memory()
                .with_cpu()
                .with_tasks(),
        );
        self.thread_counts = platform::thread_counts(&self.sys)?;

        // sysinfo lists Linux threads as entries of their own.
        let mut pids: Vec<u32> = self
            .sys
            .processes()
            .iter()
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, _)| pid.as_u32())
            .collect();
        if pids.is_empty() {
            return Err(SampleError::EmptyProcessTable);
        }
        pids.sort_unstable();
        Ok(pids)
    }

    fn probe(&self, pid: u32) -> Result<ProcessProbe, ProbeError> {
        let process = self
            .sys
            .process(Pid::from_u32(pid))
            .ok_or(ProbeError::Vanished)?;
        let status = ProcessState::from(process.status());
        let name = process.name().to_string_lossy().to_string();
        let thread_count =
            readable_thread_count(status, &name, self.thread_counts.get(&pid).copied())?;

        Ok(ProcessProbe {
            name,
            start_time: process.start_time(),
            cpu_percent: process.cpu_usage(),
            memory_bytes: platform::resident_memory(process.memory()),
            status,
            thread_count,
        })
    }

    fn totals(&self) -> SystemTotals {
        SystemTotals {
            cpu_percent: self.sys.global_cpu_usage(),
            memory_used: self.sys.used_memory(),
            memory_total: self.sys.total_memory(),
        }
    }
}

/// Thread count of a process whose details the OS still hands out.
///
/// A zombie keeps its record while its name and thread count are readable and
/// is skipped once they are gone.
fn readable_thread_count(
    status: ProcessState,
    name: &str,
    thread_count: Option<u32>,
) -> Result<u32, ProbeError> {
    match (status, thread_count) {
        (ProcessState::Zombie, Some(_)) if name.is_empty() => Err(ProbeError::Zombie),
        (_, Some(count)) => Ok(count),
        (ProcessState::Zombie, None) => Err(ProbeError::Zombie),
        (_, None) => Err(ProbeError::Unreadable(
            "thread count unavailable".to_string(),
        )),
    }
}
