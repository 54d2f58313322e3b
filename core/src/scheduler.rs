//! Host scheduler contract and a deterministic FIFO implementation.
//!
//! Futures never run a continuation inside the call that triggered it. Every
//! settlement and every handler invocation is handed to a [`Scheduler`] as a
//! [`Task`] and runs on a later turn. The core only needs a FIFO
//! "run this later" primitive; [`TaskQueue`] is that primitive for tests and
//! the conformance runner, and `host::LocalSetScheduler` wires it to tokio.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// FIFO deferred-execution facility supplied by the host.
///
/// Implementations must run tasks in the order they were scheduled and must
/// never run a task synchronously inside `schedule`.
pub trait Scheduler {
    fn schedule(&self, task: Task);
}

/// Shared handle to the scheduler a future delivers its callbacks on.
#[derive(Clone)]
pub struct SchedulerHandle(Rc<dyn Scheduler>);

impl SchedulerHandle {
    pub fn new(scheduler: impl Scheduler + 'static) -> Self {
        Self(Rc::new(scheduler))
    }

    pub fn schedule(&self, task: Task) {
        self.0.schedule(task);
    }
}

impl fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerHandle").finish_non_exhaustive()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("turn budget exhausted after {turns} tasks with {pending} still queued")]
    BudgetExhausted { turns: usize, pending: usize },
}

#[derive(Default)]
struct QueueState {
    tasks: RefCell<VecDeque<Task>>,
    max_turns: Option<usize>,
    executed: Cell<u64>,
}

/// Deterministic single-threaded task queue.
///
/// Nothing runs until the owner drives the queue with [`TaskQueue::run_next`]
/// or [`TaskQueue::run_until_idle`]. Tasks may schedule further tasks; those
/// are appended behind everything already queued.
#[derive(Clone, Default)]
pub struct TaskQueue {
    state: Rc<QueueState>,
}

impl TaskQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue whose `run_until_idle` gives up after `max_turns` tasks.
    #[must_use]
    pub fn with_budget(max_turns: usize) -> Self {
        Self {
            state: Rc::new(QueueState {
                max_turns: Some(max_turns),
                ..QueueState::default()
            }),
        }
    }

    #[must_use]
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle::new(self.clone())
    }

    /// Run the oldest queued task. Returns `false` if the queue was empty.
    pub fn run_next(&self) -> bool {
        let next = self.state.tasks.borrow_mut().pop_front();
        match next {
            Some(task) => {
                task();
                self.state.executed.set(self.state.executed.get() + 1);
                true
            }
            None => false,
        }
    }

    /// Run tasks until the queue drains, returning how many ran.
    pub fn run_until_idle(&self) -> Result<usize, SchedulerError> {
        let mut turns = 0;
        loop {
            if let Some(max_turns) = self.state.max_turns
                && turns >= max_turns
                && !self.is_empty()
            {
                let pending = self.len();
                tracing::warn!(turns, pending, "task queue turn budget exhausted");
                return Err(SchedulerError::BudgetExhausted { turns, pending });
            }
            if !self.run_next() {
                tracing::trace!(turns, "task queue idle");
                return Ok(turns);
            }
            turns += 1;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.tasks.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.tasks.borrow().is_empty()
    }

    /// Total tasks run over the queue's lifetime.
    #[must_use]
    pub fn executed(&self) -> u64 {
        self.state.executed.get()
    }
}

impl Scheduler for TaskQueue {
    fn schedule(&self, task: Task) {
        self.state.tasks.borrow_mut().push_back(task);
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("queued", &self.len())
            .field("executed", &self.executed())
            .field("max_turns", &self.state.max_turns)
            .finish()
    }
}
