//! Bridge from a Pledge future to `std::future::Future`.
//!
//! [`Settled`] lets async code await a Pledge future's outcome. It only
//! observes the future, so the future still needs its host scheduler to be
//! driven (for example, tasks spawned on the same tokio `LocalSet`).

use std::cell::RefCell;
use std::fmt;
use std::future::Future as StdFuture;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::future::Future;

struct Waiting<T, E> {
    outcome: Option<Result<T, E>>,
    waker: Option<Waker>,
}

impl<T, E> Waiting<T, E> {
    fn finish(shared: &RefCell<Self>, outcome: Result<T, E>) {
        let waker = {
            let mut waiting = shared.borrow_mut();
            waiting.outcome = Some(outcome);
            waiting.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

/// Awaitable view of a future's outcome. Created by [`Future::settled`].
pub struct Settled<T, E> {
    future: Future<T, E>,
    shared: Rc<RefCell<Waiting<T, E>>>,
    registered: bool,
}

impl<T, E> Future<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Await this future's outcome from async code.
    #[must_use]
    pub fn settled(&self) -> Settled<T, E> {
        Settled {
            future: self.clone(),
            shared: Rc::new(RefCell::new(Waiting {
                outcome: None,
                waker: None,
            })),
            registered: false,
        }
    }
}

impl<T, E> StdFuture for Settled<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if let Some(outcome) = this.shared.borrow_mut().outcome.take() {
            return Poll::Ready(outcome);
        }
        if !this.registered
            && let Some(outcome) = this.future.outcome()
        {
            return Poll::Ready(outcome);
        }

        this.shared.borrow_mut().waker = Some(cx.waker().clone());
        if !this.registered {
            this.registered = true;
            let fulfilled = Rc::clone(&this.shared);
            let rejected = Rc::clone(&this.shared);
            this.future.react(
                Box::new(move |value: T| Waiting::finish(&fulfilled, Ok(value))),
                Box::new(move |reason: E| Waiting::finish(&rejected, Err(reason))),
            );
        }
        Poll::Pending
    }
}

impl<T, E> fmt::Debug for Settled<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settled")
            .field("future", &self.future)
            .field("registered", &self.registered)
            .finish_non_exhaustive()
    }
}
