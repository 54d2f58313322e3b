//! The future state machine.
//!
//! A [`Future`] starts `Pending` and settles at most once. Settlement is
//! always deferred: the handles only commit ("seal") the future and schedule
//! the transition, and the scheduled task performs it and drains the
//! callback registries in registration order.

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

use pledge_types::{CyclicResolution, FutureId, FutureState};

use crate::resolution::{self, Resolution};
use crate::scheduler::SchedulerHandle;

pub(crate) type Callback<V> = Box<dyn FnOnce(V)>;

enum Slot<T, E> {
    Pending,
    Fulfilled(T),
    Rejected(E),
}

struct Inner<T, E> {
    slot: Slot<T, E>,
    /// Set once a settlement has been committed. The transition itself may
    /// still be waiting on the scheduler.
    sealed: bool,
    fulfill_callbacks: Vec<Callback<T>>,
    reject_callbacks: Vec<Callback<E>>,
}

/// Single-settlement value container.
///
/// Cloning a `Future` clones the handle, not the value: every clone observes
/// and settles the same underlying state.
pub struct Future<T, E> {
    inner: Rc<RefCell<Inner<T, E>>>,
    scheduler: SchedulerHandle,
}

impl<T, E> Future<T, E> {
    pub(crate) fn pending(scheduler: SchedulerHandle) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                slot: Slot::Pending,
                sealed: false,
                fulfill_callbacks: Vec::new(),
                reject_callbacks: Vec::new(),
            })),
            scheduler,
        }
    }

    #[must_use]
    pub fn id(&self) -> FutureId {
        FutureId::new(Rc::as_ptr(&self.inner).addr() as u64)
    }

    #[must_use]
    pub fn state(&self) -> FutureState {
        match self.inner.borrow().slot {
            Slot::Pending => FutureState::Pending,
            Slot::Fulfilled(_) => FutureState::Fulfilled,
            Slot::Rejected(_) => FutureState::Rejected,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.state().is_settled()
    }

    /// Whether both handles point at the same future.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    /// Commit to a settlement. Returns `false` if the future is already
    /// settled or another settlement was committed first.
    pub(crate) fn seal(&self) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.sealed || !matches!(inner.slot, Slot::Pending) {
            return false;
        }
        inner.sealed = true;
        true
    }
}

impl<T, E> Future<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Create a future and run `executor` synchronously with its handles.
    ///
    /// If the executor fails, its error rejects the future, unless the
    /// executor already settled it.
    pub fn new<F>(scheduler: &SchedulerHandle, executor: F) -> Self
    where
        F: FnOnce(Resolver<T, E>, Rejecter<T, E>) -> Result<(), E>,
    {
        let future = Self::pending(scheduler.clone());
        let rejecter = Rejecter::new(future.clone());
        if let Err(reason) = executor(Resolver::new(future.clone()), rejecter.clone()) {
            tracing::debug!(future = %future.id(), "executor failed");
            rejecter.reject(reason);
        }
        future
    }

    #[must_use]
    pub fn value(&self) -> Option<T> {
        match &self.inner.borrow().slot {
            Slot::Fulfilled(value) => Some(value.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn reason(&self) -> Option<E> {
        match &self.inner.borrow().slot {
            Slot::Rejected(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// `None` while pending.
    #[must_use]
    pub fn outcome(&self) -> Option<Result<T, E>> {
        match &self.inner.borrow().slot {
            Slot::Pending => None,
            Slot::Fulfilled(value) => Some(Ok(value.clone())),
            Slot::Rejected(reason) => Some(Err(reason.clone())),
        }
    }

    /// Schedule the transition to `outcome`. The caller must hold the seal.
    pub(crate) fn transition(&self, outcome: Result<T, E>) {
        let target = self.clone();
        self.scheduler
            .schedule(Box::new(move || target.complete(outcome)));
    }

    fn complete(&self, outcome: Result<T, E>) {
        let mut inner = self.inner.borrow_mut();
        if !matches!(inner.slot, Slot::Pending) {
            return;
        }
        let fulfill_callbacks = mem::take(&mut inner.fulfill_callbacks);
        let reject_callbacks = mem::take(&mut inner.reject_callbacks);
        match outcome {
            Ok(value) => {
                inner.slot = Slot::Fulfilled(value.clone());
                drop(inner);
                drop(reject_callbacks);
                tracing::trace!(
                    future = %self.id(),
                    callbacks = fulfill_callbacks.len(),
                    "future fulfilled"
                );
                for callback in fulfill_callbacks {
                    callback(value.clone());
                }
            }
            Err(reason) => {
                inner.slot = Slot::Rejected(reason.clone());
                drop(inner);
                drop(fulfill_callbacks);
                tracing::trace!(
                    future = %self.id(),
                    callbacks = reject_callbacks.len(),
                    "future rejected"
                );
                for callback in reject_callbacks {
                    callback(reason.clone());
                }
            }
        }
    }

    /// Register a continuation pair.
    ///
    /// Exactly one of the two runs, on a scheduler turn after the future
    /// settles. If the future is already settled the matching callback is
    /// scheduled immediately.
    pub(crate) fn react(&self, on_fulfilled: Callback<T>, on_rejected: Callback<E>) {
        let settled = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            match &inner.slot {
                Slot::Pending => {
                    let scheduler = self.scheduler.clone();
                    inner.fulfill_callbacks.push(Box::new(move |value: T| {
                        scheduler.schedule(Box::new(move || on_fulfilled(value)));
                    }));
                    let scheduler = self.scheduler.clone();
                    inner.reject_callbacks.push(Box::new(move |reason: E| {
                        scheduler.schedule(Box::new(move || on_rejected(reason)));
                    }));
                    return;
                }
                Slot::Fulfilled(value) => Ok(value.clone()),
                Slot::Rejected(reason) => Err(reason.clone()),
            }
        };
        match settled {
            Ok(value) => self
                .scheduler
                .schedule(Box::new(move || on_fulfilled(value))),
            Err(reason) => self
                .scheduler
                .schedule(Box::new(move || on_rejected(reason))),
        }
    }

    #[cfg(test)]
    pub(crate) fn registered_callbacks(&self) -> (usize, usize) {
        let inner = self.inner.borrow();
        (inner.fulfill_callbacks.len(), inner.reject_callbacks.len())
    }
}

impl<T, E> Clone for Future<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Future<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("id", &self.id())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Fulfillment handle bound to one future.
pub struct Resolver<T, E> {
    future: Future<T, E>,
}

impl<T, E> Resolver<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    pub(crate) fn new(future: Future<T, E>) -> Self {
        Self { future }
    }

    /// Fulfill with a plain value. Ignored if the future was already settled
    /// or committed.
    pub fn resolve(&self, value: T) {
        if self.future.seal() {
            self.future.transition(Ok(value));
        } else {
            tracing::trace!(future = %self.future.id(), "resolve ignored");
        }
    }

    /// Settle by running the resolution procedure on `resolution`, adopting
    /// the state of a thenable if it is one.
    pub fn follow(&self, resolution: Resolution<T, E>)
    where
        E: From<CyclicResolution>,
    {
        if self.future.seal() {
            resolution::resolve_future(&self.future, resolution);
        } else {
            tracing::trace!(future = %self.future.id(), "follow ignored");
        }
    }
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            future: self.future.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Resolver").field(&self.future.id()).finish()
    }
}

/// Rejection handle bound to one future.
pub struct Rejecter<T, E> {
    future: Future<T, E>,
}

impl<T, E> Rejecter<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    pub(crate) fn new(future: Future<T, E>) -> Self {
        Self { future }
    }

    /// Reject with `reason`. Ignored if the future was already settled or
    /// committed.
    pub fn reject(&self, reason: E) {
        if self.future.seal() {
            self.future.transition(Err(reason));
        } else {
            tracing::trace!(future = %self.future.id(), "reject ignored");
        }
    }
}

impl<T, E> Clone for Rejecter<T, E> {
    fn clone(&self) -> Self {
        Self {
            future: self.future.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Rejecter<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rejecter").field(&self.future.id()).finish()
    }
}
