//! Constructors and combinators built on the public future API.

use std::cell::{Cell, RefCell};
use std::mem;
use std::rc::Rc;

use pledge_types::CyclicResolution;

use crate::future::Future;
use crate::resolution::Resolution;
use crate::scheduler::SchedulerHandle;

impl<T, E> Future<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// A future fulfilled with `value`. Callbacks are still delivered on a
    /// later scheduler turn.
    pub fn resolved_with(scheduler: &SchedulerHandle, value: T) -> Self {
        Self::new(scheduler, |resolve, _| {
            resolve.resolve(value);
            Ok(())
        })
    }

    /// A future rejected with `reason`.
    pub fn rejected_with(scheduler: &SchedulerHandle, reason: E) -> Self {
        Self::new(scheduler, |_, reject| {
            reject.reject(reason);
            Ok(())
        })
    }
}

impl<T, E> Future<T, E>
where
    T: Clone + 'static,
    E: Clone + From<CyclicResolution> + 'static,
{
    /// Settle with whichever input settles first.
    ///
    /// Later outcomes are computed and discarded; nothing is cancelled. With
    /// no inputs the result stays pending forever.
    pub fn race<I>(scheduler: &SchedulerHandle, futures: I) -> Self
    where
        I: IntoIterator<Item = Future<T, E>>,
    {
        Self::new(scheduler, |resolve, reject| {
            for future in futures {
                let resolve = resolve.clone();
                let reject = reject.clone();
                future.then(
                    move |value| {
                        resolve.resolve(value);
                        Ok(Resolution::Value(()))
                    },
                    move |reason| {
                        reject.reject(reason);
                        Ok(Resolution::Value(()))
                    },
                );
            }
            Ok(())
        })
    }
}

impl<T, E> Future<Vec<T>, E>
where
    T: Clone + 'static,
    E: Clone + From<CyclicResolution> + 'static,
{
    /// Fulfill with every input's value, in input order, once all of them
    /// have fulfilled. The first rejection rejects the result.
    pub fn all_of<I>(scheduler: &SchedulerHandle, futures: I) -> Self
    where
        I: IntoIterator<Item = Future<T, E>>,
    {
        Self::new(scheduler, |resolve, reject| {
            let futures: Vec<_> = futures.into_iter().collect();
            if futures.is_empty() {
                resolve.resolve(Vec::new());
                return Ok(());
            }

            let results: Rc<RefCell<Vec<Option<T>>>> =
                Rc::new(RefCell::new(vec![None; futures.len()]));
            let remaining = Rc::new(Cell::new(futures.len()));

            for (index, future) in futures.into_iter().enumerate() {
                let resolve = resolve.clone();
                let reject = reject.clone();
                let results = Rc::clone(&results);
                let remaining = Rc::clone(&remaining);
                future.then(
                    move |value| {
                        results.borrow_mut()[index] = Some(value);
                        remaining.set(remaining.get() - 1);
                        if remaining.get() == 0 {
                            let values = mem::take(&mut *results.borrow_mut());
                            resolve.resolve(values.into_iter().flatten().collect());
                        }
                        Ok(Resolution::Value(()))
                    },
                    move |reason| {
                        reject.reject(reason);
                        Ok(Resolution::Value(()))
                    },
                );
            }
            Ok(())
        })
    }
}
