//! tokio host scheduler.
//!
//! Compiled only with the `tokio` feature. Its tests live in the workspace
//! integration suite (`tests/suite/host.rs`), which enables the feature.

use tokio::task::spawn_local;

use crate::scheduler::{Scheduler, SchedulerHandle, Task};

/// Delivers tasks with `tokio::task::spawn_local`.
///
/// Every future using this scheduler must be driven from inside a
/// `tokio::task::LocalSet`; `schedule` panics outside one.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSetScheduler;

impl LocalSetScheduler {
    #[must_use]
    pub fn handle() -> SchedulerHandle {
        SchedulerHandle::new(Self)
    }
}

impl Scheduler for LocalSetScheduler {
    fn schedule(&self, task: Task) {
        spawn_local(async move { task() });
    }
}

