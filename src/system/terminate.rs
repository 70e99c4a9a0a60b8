#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminateOutcome {
    Signalled(u32),
    NotFound(u32),
    PermissionDenied(u32),
    Failed(u32, String),
}

impl TerminateOutcome {
    pub fn pid(&self) -> u32 {
        match self {
            TerminateOutcome::Signalled(pid)
            | TerminateOutcome::NotFound(pid)
            | TerminateOutcome::PermissionDenied(pid)
            | TerminateOutcome::Failed(pid, _) => *pid,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TerminateOutcome::Signalled(_))
    }

    pub fn message(&self) -> String {
        match self {
            TerminateOutcome::Signalled(pid) => format!("Sent SIGTERM to PID {pid}"),
            TerminateOutcome::NotFound(pid) => format!("Process {pid} not found"),
            TerminateOutcome::PermissionDenied(pid) => format!("Permission denied for PID {pid}"),
            TerminateOutcome::Failed(pid, reason) => {
                format!("Failed to terminate PID {pid}: {reason}")
            }
        }
    }
}

/// Asks the process to exit (SIGTERM on Unix). Never force-kills.
pub fn terminate_process(pid: u32) -> TerminateOutcome {
    // 0 and values past i32::MAX would address process groups or every process.
    if pid == 0 || i32::try_from(pid).is_err() {
        return TerminateOutcome::NotFound(pid);
    }
    send_terminate(pid)
}

#[cfg(unix)]
fn send_terminate(pid: u32) -> TerminateOutcome {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        Ok(()) => TerminateOutcome::Signalled(pid),
        Err(Errno::ESRCH) => TerminateOutcome::NotFound(pid),
        Err(Errno::EPERM) => TerminateOutcome::PermissionDenied(pid),
        Err(errno) => TerminateOutcome::Failed(pid, errno.desc().to_string()),
    }
}

#[cfg(not(unix))]
fn send_terminate(pid: u32) -> TerminateOutcome {
    use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, Signal, System};

    let sys_pid = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[sys_pid]),
        true,
        ProcessRefreshKind::nothing(),
    );
    match sys.process(sys_pid) {
        Some(process) => match process.kill_with(Signal::Term) {
            Some(true) => TerminateOutcome::Signalled(pid),
            Some(false) => TerminateOutcome::PermissionDenied(pid),
            None => TerminateOutcome::Failed(
                pid,
                "graceful termination is not supported on this platform".to_string(),
            ),
        },
        None => TerminateOutcome::NotFound(pid),
    }
}
