//! Continuation chaining.
//!
//! Every chaining method returns a fresh child future and leaves the parent
//! untouched apart from its callback registries. Handlers run on a scheduler
//! turn after the parent settles; whatever they return goes through the
//! resolution procedure to settle the child.

use pledge_types::CyclicResolution;

use crate::future::Future;
use crate::resolution::{self, Resolution};

/// What a handler hands back: `Ok` to resolve the child (possibly by adopting
/// a thenable), `Err` to reject it.
pub type HandlerResult<U, E> = Result<Resolution<U, E>, E>;

impl<T, E> Future<T, E>
where
    T: Clone + 'static,
    E: Clone + From<CyclicResolution> + 'static,
{
    /// Chain a fulfillment handler and a rejection handler.
    pub fn then<U, F, R>(&self, on_fulfilled: F, on_rejected: R) -> Future<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> HandlerResult<U, E> + 'static,
        R: FnOnce(E) -> HandlerResult<U, E> + 'static,
    {
        let child = Future::pending(self.scheduler().clone());
        let fulfilled_child = child.clone();
        let rejected_child = child.clone();
        self.react(
            Box::new(move |value: T| settle_child(&fulfilled_child, on_fulfilled(value))),
            Box::new(move |reason: E| settle_child(&rejected_child, on_rejected(reason))),
        );
        child
    }

    /// Chain a fulfillment handler. Rejections pass through to the child
    /// unchanged.
    pub fn then_ok<U, F>(&self, on_fulfilled: F) -> Future<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> HandlerResult<U, E> + 'static,
    {
        self.then(on_fulfilled, Err)
    }

    /// Transform the fulfilled value.
    pub fn map<U, F>(&self, op: F) -> Future<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> U + 'static,
    {
        self.then_ok(move |value| Ok(Resolution::Value(op(value))))
    }

    /// Chain a rejection handler. Fulfillment passes through unchanged.
    pub fn catch<R>(&self, on_rejected: R) -> Future<T, E>
    where
        R: FnOnce(E) -> HandlerResult<T, E> + 'static,
    {
        self.then(|value| Ok(Resolution::Value(value)), on_rejected)
    }
}

fn settle_child<U, E>(child: &Future<U, E>, result: HandlerResult<U, E>)
where
    U: Clone + 'static,
    E: Clone + From<CyclicResolution> + 'static,
{
    if !child.seal() {
        return;
    }
    match result {
        Ok(resolution) => resolution::resolve_future(child, resolution),
        Err(reason) => {
            tracing::debug!(future = %child.id(), "handler failed");
            child.transition(Err(reason));
        }
    }
}
