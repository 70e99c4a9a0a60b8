use std::collections::HashMap;
use std::io;

use sysinfo::System;

use super::PlatformExtensions;

pub struct Platform;

#[cfg(target_os = "windows")]
use windows_sys::Win32::{
    Foundation::{CloseHandle, INVALID_HANDLE_VALUE},
    System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
        TH32CS_SNAPPROCESS,
    },
};

impl PlatformExtensions for Platform {
    /// One ToolHelp walk covers every process, so a refresh opens a single snapshot handle.
    #[cfg(target_os = "windows")]
    fn thread_counts(_sys: &System) -> io::Result<HashMap<u32, u32>> {
        let mut counts = HashMap::new();
        unsafe {
            let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0);
            if snapshot == INVALID_HANDLE_VALUE {
                return Err(io::Error::last_os_error());
            }
            let mut entry = std::mem::zeroed::<PROCESSENTRY32W>();
            entry.dwSize = std::mem::size_of::<PROCESSENTRY32W>() as u32;

            if Process32FirstW(snapshot, &mut entry) != 0 {
                loop {
                    counts.insert(entry.th32ProcessID, entry.cntThreads);
                    if Process32NextW(snapshot, &mut entry) == 0 {
                        break;
                    }
                }
            }
            CloseHandle(snapshot);
        }
        Ok(counts)
    }

    #[cfg(not(target_os = "windows"))]
    fn thread_counts(_sys: &System) -> io::Result<HashMap<u32, u32>> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }

    fn resident_memory(reported: u64) -> Option<u64> {
        // sysinfo leaves 0 when OpenProcess was refused.
        (reported > 0).then_some(reported)
    }

    #[cfg(target_os = "windows")]
    fn check_process_table() -> io::Result<()> {
        unsafe {
            let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0);
            if snapshot == INVALID_HANDLE_VALUE {
                return Err(io::Error::last_os_error());
            }
            CloseHandle(snapshot);
        }
        Ok(())
    }

    #[cfg(not(target_os = "windows"))]
    fn check_process_table() -> io::Result<()> {
        Ok(())
    }
}
