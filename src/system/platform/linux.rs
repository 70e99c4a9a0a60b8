use std::collections::HashMap;
use std::io;

use sysinfo::System;

use super::PlatformExtensions;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn thread_counts(sys: &System) -> io::Result<HashMap<u32, u32>> {
        // sysinfo lists every thread as its own entry; only thread-group leaders carry tasks.
        let counts = sys
            .processes()
            .iter()
            .filter(|(_, process)| process.thread_kind().is_none())
            .filter_map(|(pid, process)| {
                let tasks = process.tasks()?;
                // The task set leaves out the leader's own thread.
                Some((pid.as_u32(), tasks.len() as u32 + 1))
            })
            .collect();
        Ok(counts)
    }

    fn resident_memory(reported: u64) -> Option<u64> {
        // statm is world-readable, so 0 is a real reading (kernel threads have no RSS).
        Some(reported)
    }

    fn check_process_table() -> io::Result<()> {
        std::fs::read_dir("/proc").map(|_| ())
    }
}
