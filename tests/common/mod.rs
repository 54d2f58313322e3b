//! Shared test utilities and fixtures
//!
//! Foreign thenables and queue helpers for integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pledge_core::{
    Future, OnFulfilled, OnRejected, Reason, Resolution, SchedulerHandle, TaskQueue, Thenable,
};

/// Integration tests never need more turns than this.
pub const TEST_BUDGET: usize = 10_000;

pub fn queue() -> (TaskQueue, SchedulerHandle) {
    let queue = TaskQueue::with_budget(TEST_BUDGET);
    let handle = queue.handle();
    (queue, handle)
}

pub fn drain(queue: &TaskQueue) {
    queue.run_until_idle().unwrap();
}

pub fn fulfilled(handle: &SchedulerHandle, value: i32) -> Future<i32, Reason> {
    Future::resolved_with(handle, value)
}

pub fn rejected(handle: &SchedulerHandle, reason: &str) -> Future<i32, Reason> {
    Future::rejected_with(handle, Reason::from(reason))
}

/// Calls `on_fulfilled` synchronously inside `then`.
pub struct SyncValue(pub i32);

impl Thenable<i32, Reason> for SyncValue {
    fn then(
        &self,
        on_fulfilled: OnFulfilled<i32, Reason>,
        _on_rejected: OnRejected<Reason>,
    ) -> Result<(), Reason> {
        on_fulfilled(Resolution::Value(self.0));
        Ok(())
    }
}

/// Calls `on_rejected` synchronously inside `then`.
pub struct SyncReason(pub &'static str);

impl Thenable<i32, Reason> for SyncReason {
    fn then(
        &self,
        _on_fulfilled: OnFulfilled<i32, Reason>,
        on_rejected: OnRejected<Reason>,
    ) -> Result<(), Reason> {
        on_rejected(Reason::from(self.0));
        Ok(())
    }
}

/// Signals rejection, then fulfillment, then fails.
pub struct Chaotic;

impl Thenable<i32, Reason> for Chaotic {
    fn then(
        &self,
        on_fulfilled: OnFulfilled<i32, Reason>,
        on_rejected: OnRejected<Reason>,
    ) -> Result<(), Reason> {
        on_rejected(Reason::from("first"));
        on_fulfilled(Resolution::Value(2));
        Err(Reason::from("third"))
    }
}

/// Fails without ever signalling.
pub struct Unchainable;

impl Thenable<i32, Reason> for Unchainable {
    fn then(
        &self,
        _on_fulfilled: OnFulfilled<i32, Reason>,
        _on_rejected: OnRejected<Reason>,
    ) -> Result<(), Reason> {
        Err(Reason::from("cannot chain"))
    }
}

/// Holds its continuations until the test fires them. Clones share state.
#[derive(Clone, Default)]
pub struct Manual(Rc<ManualState>);

#[derive(Default)]
pub struct ManualState {
    fulfill: RefCell<Option<OnFulfilled<i32, Reason>>>,
    reject: RefCell<Option<OnRejected<Reason>>>,
    calls: Cell<usize>,
}

impl Manual {
    pub fn calls(&self) -> usize {
        self.0.calls.get()
    }

    pub fn fulfill(&self, resolution: Resolution<i32, Reason>) {
        let callback = self.0.fulfill.borrow_mut().take();
        if let Some(callback) = callback {
            callback(resolution);
        }
    }

    pub fn reject(&self, reason: &str) {
        let callback = self.0.reject.borrow_mut().take();
        if let Some(callback) = callback {
            callback(Reason::from(reason));
        }
    }
}

impl Thenable<i32, Reason> for Manual {
    fn then(
        &self,
        on_fulfilled: OnFulfilled<i32, Reason>,
        on_rejected: OnRejected<Reason>,
    ) -> Result<(), Reason> {
        self.0.calls.set(self.0.calls.get() + 1);
        *self.0.fulfill.borrow_mut() = Some(on_fulfilled);
        *self.0.reject.borrow_mut() = Some(on_rejected);
        Ok(())
    }
}
