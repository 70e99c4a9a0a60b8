use std::collections::HashMap;
use std::io;

use sysinfo::System;

pub trait PlatformExtensions {
    /// Thread counts for the processes in `sys`, gathered once per refresh.
    /// Processes the OS would not describe are left out.
    fn thread_counts(sys: &System) -> io::Result<HashMap<u32, u32>>;
    /// Resident memory as sysinfo reported it, or `None` when the OS refused the read.
    fn resident_memory(reported: u64) -> Option<u64>;
    /// Fails when the process table cannot be listed at all.
    fn check_process_table() -> io::Result<()>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn thread_counts(sys: &System) -> io::Result<HashMap<u32, u32>> {
    platform_impl::Platform::thread_counts(sys)
}

pub fn resident_memory(reported: u64) -> Option<u64> {
    platform_impl::Platform::resident_memory(reported)
}

pub fn check_process_table() -> io::Result<()> {
    platform_impl::Platform::check_process_table()
}
