use std::collections::{HashMap, HashSet};
use std::time::SystemTime;

use super::record::{ProcessRecord, Snapshot};
use super::source::{ProcessSource, SampleError};

/// Produces one [`Snapshot`] per call.
///
/// CPU figures are cumulative since the previous call. Each process is
/// identified by its PID together with its start time and name; a PID that
/// shows up with a different identity is a new process and reports 0.0 until it
/// has a baseline of its own. The same holds for every process on the first call.
///
/// Start times have one-second resolution, so a PID reused within the same
/// second by a process of the same name still passes as the old one.
pub struct Sampler<S> {
    source: S,
    identities: HashMap<u32, Identity>,
}

#[derive(Debug, PartialEq, Eq)]
struct Identity {
    start_time: u64,
    name: String,
}

impl<S: ProcessSource> Sampler<S> {
    pub fn new(source: S) -> Self {
        Sampler {
            source,
            identities: HashMap::new(),
        }
    }

    pub fn snapshot(&mut self) -> Result<Snapshot, SampleError> {
        let _snapshot_span = tracing::debug_span!("sampler.snapshot").entered();

        let pids = self.source.refresh()?;

        let mut seen = HashSet::with_capacity(pids.len());
        let mut identities = HashMap::with_capacity(pids.len());
        let mut processes = Vec::with_capacity(pids.len());
        let mut skipped = 0usize;

        for pid in pids {
            if !seen.insert(pid) {
                continue;
            }
            let probe = match self.source.probe(pid) {
                Ok(probe) => probe,
                Err(reason) => {
                    tracing::trace!(pid, %reason, "process skipped");
                    skipped += 1;
                    continue;
                }
            };

            let identity = Identity {
                start_time: probe.start_time,
                name: probe.name.clone(),
            };
            let cpu_percent = if self.identities.get(&pid) == Some(&identity) {
                clamp_cpu(probe.cpu_percent)
            } else {
                0.0
            };
            identities.insert(pid, identity);

            processes.push(ProcessRecord {
                pid,
                name: probe.name,
                cpu_percent,
                memory_bytes: probe.memory_bytes,
                status: probe.status,
                thread_count: probe.thread_count,
            });
        }

        self.identities = identities;
        tracing::debug!(processes = processes.len(), skipped, "snapshot collected");

        Ok(Snapshot {
            taken_at: SystemTime::now(),
            totals: self.source.totals(),
            processes,
        })
    }
}

fn clamp_cpu(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::VecDeque;
    use std::io;

    use crate::system::record::{ProcessState, SystemTotals};
    use crate::system::source::{ProbeError, ProcessProbe, ProcessSource, SampleError};

    /// One process-table state as the fake OS reports it.
    #[derive(Clone, Debug, Default)]
    pub struct Table {
        pub order: Vec<u32>,
        pub entries: Vec<(u32, Result<ProcessProbe, ProbeError>)>,
        pub fail: bool,
    }

    impl Table {
        pub fn with(mut self, pid: u32, entry: Result<ProcessProbe, ProbeError>) -> Self {
            self.order.push(pid);
            self.entries.push((pid, entry));
            self
        }

        pub fn failing() -> Self {
            Table {
                fail: true,
                ..Table::default()
            }
        }
    }

    pub fn probe(name: &str, start_time: u64, cpu: f32) -> ProcessProbe {
        ProcessProbe {
            name: name.to_string(),
            start_time,
            cpu_percent: cpu,
            memory_bytes: Some(4096),
            status: ProcessState::Running,
            thread_count: 1,
        }
    }

    /// Replays queued tables, repeating the last one once the queue drains.
    #[derive(Default)]
    pub struct FakeSource {
        queued: VecDeque<Table>,
        current: Table,
    }

    impl FakeSource {
        pub fn new(tables: impl IntoIterator<Item = Table>) -> Self {
            FakeSource {
                queued: tables.into_iter().collect(),
                current: Table::default(),
            }
        }
    }

    impl ProcessSource for FakeSource {
        fn refresh(&mut self) -> Result<Vec<u32>, SampleError> {
            if let Some(next) = self.queued.pop_front() {
                self.current = next;
            }
            if self.current.fail {
                return Err(SampleError::Enumeration(io::Error::other("proc unavailable")));
            }
            Ok(self.current.order.clone())
        }

        fn probe(&self, pid: u32) -> Result<ProcessProbe, ProbeError> {
            self.current
                .entries
                .iter()
                .find(|(p, _)| *p == pid)
                .map(|(_, entry)| entry.clone())
                .unwrap_or(Err(ProbeError::Vanished))
        }

        fn totals(&self) -> SystemTotals {
            SystemTotals {
                cpu_percent: 12.5,
                memory_used: 1024,
                memory_total: 4096,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{FakeSource, Table, probe};
    use super::*;
    use crate::system::record::ProcessState;
    use crate::system::source::ProbeError;

    fn pids(snapshot: &Snapshot) -> Vec<u32> {
        snapshot.pids().collect()
    }

    #[test]
    fn skips_vanished_denied_and_zombie_processes() {
        let table = Table::default()
            .with(1, Ok(probe("init", 10, 0.5)))
            .with(2, Err(ProbeError::Vanished))
            .with(3, Err(ProbeError::AccessDenied))
            .with(4, Err(ProbeError::Zombie))
            .with(5, Ok(probe("shell", 20, 1.0)));
        let mut sampler = Sampler::new(FakeSource::new([table]));

        let snapshot = sampler.snapshot().unwrap();
        assert_eq!(pids(&snapshot), vec![1, 5]);
    }

    #[test]
    fn readable_zombie_is_kept_with_zombie_status() {
        let mut zombie = probe("sh", 30, 0.0);
        zombie.status = ProcessState::Zombie;
        let table = Table::default()
            .with(1, Ok(probe("init", 10, 0.5)))
            .with(12244, Ok(zombie))
            .with(12245, Err(ProbeError::Zombie));
        let mut sampler = Sampler::new(FakeSource::new([table]));

        let snapshot = sampler.snapshot().unwrap();
        assert_eq!(pids(&snapshot), vec![1, 12244]);
        assert_eq!(snapshot.get(12244).unwrap().status, ProcessState::Zombie);
    }

    #[test]
    fn enumeration_failure_is_returned() {
        let mut sampler = Sampler::new(FakeSource::new([Table::failing()]));
        let err = sampler.snapshot().unwrap_err();
        assert!(matches!(err, SampleError::Enumeration(_)));
    }

    #[test]
    fn duplicate_pids_collapse_to_first() {
        let mut table = Table::default()
            .with(7, Ok(probe("first", 1, 0.0)))
            .with(8, Ok(probe("other", 1, 0.0)));
        table.order.push(7);
        let mut sampler = Sampler::new(FakeSource::new([table]));

        let snapshot = sampler.snapshot().unwrap();
        assert_eq!(pids(&snapshot), vec![7, 8]);
        assert_eq!(snapshot.get(7).unwrap().name, "first");
    }

    #[test]
    fn first_observation_reports_zero_cpu() {
        let table = Table::default().with(1, Ok(probe("busy", 100, 80.0)));
        let mut sampler = Sampler::new(FakeSource::new([table]));

        let first = sampler.snapshot().unwrap();
        assert_eq!(first.get(1).unwrap().cpu_percent, 0.0);

        let second = sampler.snapshot().unwrap();
        assert_eq!(second.get(1).unwrap().cpu_percent, 80.0);
    }

    #[test]
    fn reused_pid_does_not_inherit_baseline() {
        let before = Table::default().with(42, Ok(probe("old", 100, 30.0)));
        let after = Table::default().with(42, Ok(probe("new", 250, 55.0)));
        let mut sampler = Sampler::new(FakeSource::new([before.clone(), before, after]));

        sampler.snapshot().unwrap();
        let warm = sampler.snapshot().unwrap();
        assert_eq!(warm.get(42).unwrap().cpu_percent, 30.0);

        let reused = sampler.snapshot().unwrap();
        let record = reused.get(42).unwrap();
        assert_eq!(record.name, "new");
        assert_eq!(record.cpu_percent, 0.0);

        let settled = sampler.snapshot().unwrap();
        assert_eq!(settled.get(42).unwrap().cpu_percent, 55.0);
    }

    #[test]
    fn reused_pid_with_new_name_in_same_second_resets_cpu() {
        let before = Table::default().with(42, Ok(probe("cc1", 100, 30.0)));
        let after = Table::default().with(42, Ok(probe("ld", 100, 55.0)));
        let mut sampler = Sampler::new(FakeSource::new([before.clone(), before, after]));

        sampler.snapshot().unwrap();
        sampler.snapshot().unwrap();
        let reused = sampler.snapshot().unwrap();
        assert_eq!(reused.get(42).unwrap().cpu_percent, 0.0);
    }

    #[test]
    fn zero_memory_reading_is_kept() {
        let mut kernel_thread = probe("kthreadd", 1, 0.0);
        kernel_thread.memory_bytes = Some(0);
        let table = Table::default().with(2, Ok(kernel_thread));
        let mut sampler = Sampler::new(FakeSource::new([table]));

        let snapshot = sampler.snapshot().unwrap();
        assert_eq!(snapshot.get(2).unwrap().memory_bytes, Some(0));
    }

    #[test]
    fn absent_memory_stays_absent() {
        let mut denied = probe("guarded", 1, 0.0);
        denied.memory_bytes = None;
        let table = Table::default().with(9, Ok(denied));
        let mut sampler = Sampler::new(FakeSource::new([table]));

        let snapshot = sampler.snapshot().unwrap();
        assert_eq!(snapshot.get(9).unwrap().memory_bytes, None);
    }

    #[test]
    fn non_finite_cpu_is_zeroed() {
        let table = Table::default()
            .with(1, Ok(probe("nan", 1, f32::NAN)))
            .with(2, Ok(probe("neg", 1, -4.0)));
        let mut sampler = Sampler::new(FakeSource::new([table]));
        sampler.snapshot().unwrap();

        let snapshot = sampler.snapshot().unwrap();
        assert_eq!(snapshot.get(1).unwrap().cpu_percent, 0.0);
        assert_eq!(snapshot.get(2).unwrap().cpu_percent, 0.0);
    }

    #[test]
    fn repeated_snapshots_of_static_table_share_pids() {
        let table = Table::default()
            .with(1, Ok(probe("a", 1, 1.0)))
            .with(2, Ok(probe("b", 1, 2.0)))
            .with(3, Ok(probe("c", 1, 3.0)));
        let mut sampler = Sampler::new(FakeSource::new([table]));

        let first = sampler.snapshot().unwrap();
        let second = sampler.snapshot().unwrap();
        assert_eq!(pids(&first), pids(&second));
    }

    #[test]
    fn totals_come_from_source() {
        let table = Table::default().with(1, Ok(probe("a", 1, 0.0)));
        let mut sampler = Sampler::new(FakeSource::new([table]));
        let snapshot = sampler.snapshot().unwrap();
        assert_eq!(snapshot.totals.memory_total, 4096);
        assert!((snapshot.totals.memory_percent() - 25.0).abs() < f32::EPSILON);
    }
}
