//! Manual settlement handles.
//!
//! A [`Deferred`] exposes a fresh future together with the handles that settle
//! it, for code that has to settle a future outside an executor. Compliance
//! harnesses drive the implementation through this and `then` alone.

use std::fmt;

use crate::future::{Future, Rejecter, Resolver};
use crate::scheduler::SchedulerHandle;

pub struct Deferred<T, E> {
    pub future: Future<T, E>,
    pub resolve: Resolver<T, E>,
    pub reject: Rejecter<T, E>,
}

impl<T, E> Deferred<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    #[must_use]
    pub fn new(scheduler: &SchedulerHandle) -> Self {
        let future = Future::pending(scheduler.clone());
        Self {
            resolve: Resolver::new(future.clone()),
            reject: Rejecter::new(future.clone()),
            future,
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (Future<T, E>, Resolver<T, E>, Rejecter<T, E>) {
        (self.future, self.resolve, self.reject)
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("future", &self.future)
            .finish_non_exhaustive()
    }
}

/// Create a pending future with its settlement handles.
#[must_use]
pub fn make_deferred<T, E>(scheduler: &SchedulerHandle) -> Deferred<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    Deferred::new(scheduler)
}
