use std::collections::HashMap;
use std::io;

use libproc::libproc::proc_pid::{ProcType, listpids, pidinfo};
use libproc::libproc::task_info::TaskAllInfo;
use sysinfo::System;

use super::PlatformExtensions;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn thread_counts(sys: &System) -> io::Result<HashMap<u32, u32>> {
        // proc_pidinfo fails for other users' processes unless running as root
        let counts = sys
            .processes()
            .keys()
            .filter_map(|pid| {
                let info = pidinfo::<TaskAllInfo>(pid.as_u32() as i32, 0).ok()?;
                let threads = u32::try_from(info.ptinfo.pti_threadnum).ok()?;
                Some((pid.as_u32(), threads))
            })
            .collect();
        Ok(counts)
    }

    fn resident_memory(reported: u64) -> Option<u64> {
        // Memory comes from the same task info as the thread count, and a process
        // without a thread count is skipped.
        Some(reported)
    }

    fn check_process_table() -> io::Result<()> {
        listpids(ProcType::ProcAllPIDS)
            .map(|_| ())
            .map_err(io::Error::other)
    }
}
