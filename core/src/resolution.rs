//! Thenable interop and the resolution procedure.
//!
//! Anything that can be chained with two continuations is a [`Thenable`]:
//! Pledge's own [`Future`] and any foreign implementation alike. Whenever a
//! continuation hands back a [`Resolution`], [`resolve_future`] decides how
//! the waiting future settles, following thenables to arbitrary depth.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use pledge_types::{CyclicResolution, FutureId};

use crate::future::Future;

/// Continuation invoked when a thenable fulfills. The value may itself be
/// another thenable.
pub type OnFulfilled<T, E> = Box<dyn FnOnce(Resolution<T, E>)>;

/// Continuation invoked when a thenable rejects.
pub type OnRejected<E> = Box<dyn FnOnce(E)>;

/// The two-continuation chaining contract.
///
/// Implementors call at most one continuation, at most once. The resolution
/// procedure tolerates implementors that break that rule: only the first
/// signal is honored.
pub trait Thenable<T, E> {
    /// Register continuations. Returning `Err` means the thenable could not be
    /// chained at all; the error becomes the rejection reason unless a
    /// continuation already fired.
    fn then(&self, on_fulfilled: OnFulfilled<T, E>, on_rejected: OnRejected<E>)
    -> Result<(), E>;

    /// Identity used to detect a future resolving to itself. Foreign
    /// thenables that can never be the target return `None`.
    fn future_id(&self) -> Option<FutureId> {
        None
    }
}

/// What a continuation produces: a plain value, or a thenable to adopt.
pub enum Resolution<T, E> {
    Value(T),
    Thenable(Rc<dyn Thenable<T, E>>),
}

impl<T, E> Resolution<T, E> {
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    pub fn thenable(thenable: impl Thenable<T, E> + 'static) -> Self {
        Self::Thenable(Rc::new(thenable))
    }

    #[must_use]
    pub fn is_thenable(&self) -> bool {
        matches!(self, Self::Thenable(_))
    }
}

impl<T, E> From<Future<T, E>> for Resolution<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    fn from(future: Future<T, E>) -> Self {
        Self::Thenable(Rc::new(future))
    }
}

impl<T: fmt::Debug, E> fmt::Debug for Resolution<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Thenable(thenable) => f
                .debug_struct("Thenable")
                .field("future_id", &thenable.future_id())
                .finish(),
        }
    }
}

impl<T, E> Thenable<T, E> for Future<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    fn then(
        &self,
        on_fulfilled: OnFulfilled<T, E>,
        on_rejected: OnRejected<E>,
    ) -> Result<(), E> {
        self.react(
            Box::new(move |value: T| on_fulfilled(Resolution::Value(value))),
            on_rejected,
        );
        Ok(())
    }

    fn future_id(&self) -> Option<FutureId> {
        Some(self.id())
    }
}

/// Single-use guard for one resolution attempt. Whichever signal claims it
/// first decides the outcome; every later signal is dropped.
#[derive(Clone, Default)]
struct Attempt(Rc<Cell<bool>>);

impl Attempt {
    fn claim(&self) -> bool {
        !self.0.replace(true)
    }
}

/// Settle `target` from `resolution`. The caller must hold `target`'s seal.
pub(crate) fn resolve_future<T, E>(target: &Future<T, E>, resolution: Resolution<T, E>)
where
    T: Clone + 'static,
    E: Clone + From<CyclicResolution> + 'static,
{
    let thenable = match resolution {
        Resolution::Value(value) => {
            target.transition(Ok(value));
            return;
        }
        Resolution::Thenable(thenable) => thenable,
    };

    if thenable.future_id() == Some(target.id()) {
        tracing::debug!(future = %target.id(), "rejecting cyclic resolution");
        target.transition(Err(E::from(CyclicResolution::new(target.id()))));
        return;
    }

    let attempt = Attempt::default();
    let on_fulfilled: OnFulfilled<T, E> = {
        let target = target.clone();
        let attempt = attempt.clone();
        Box::new(move |next: Resolution<T, E>| {
            if attempt.claim() {
                resolve_future(&target, next);
            }
        })
    };
    let on_rejected: OnRejected<E> = {
        let target = target.clone();
        let attempt = attempt.clone();
        Box::new(move |reason: E| {
            if attempt.claim() {
                target.transition(Err(reason));
            }
        })
    };

    if let Err(reason) = thenable.then(on_fulfilled, on_rejected) {
        if attempt.claim() {
            tracing::debug!(future = %target.id(), "thenable failed to chain");
            target.transition(Err(reason));
        } else {
            tracing::trace!(future = %target.id(), "thenable error after settlement ignored");
        }
    }
}
