//! Single-settlement futures for single-threaded hosts.
//!
//! # Architecture
//!
//! ```text
//! Future (state machine) -> resolution procedure -> then/catch chaining
//!                                                       |
//!                                                       v
//!                                  combinators (race, all_of) / make_deferred
//! ```
//!
//! A [`Future`] is settled once, by its [`Resolver`]/[`Rejecter`] handles or
//! by the resolution procedure acting for a chained handler. Nothing runs
//! inside the call that triggers it: transitions and handler invocations are
//! handed to the future's [`Scheduler`] and run on a later turn.
//!
//! Anything implementing [`Thenable`] can be returned from a handler and is
//! adopted the same way a Pledge future is.

mod chain;
mod combinators;
mod deferred;
mod future;
#[cfg(feature = "tokio")]
mod host;
mod resolution;
mod scheduler;
mod wait;

pub use chain::HandlerResult;
pub use deferred::{Deferred, make_deferred};
pub use future::{Future, Rejecter, Resolver};
#[cfg(feature = "tokio")]
pub use host::LocalSetScheduler;
pub use resolution::{OnFulfilled, OnRejected, Resolution, Thenable};
pub use scheduler::{Scheduler, SchedulerError, SchedulerHandle, Task, TaskQueue};
pub use wait::Settled;

pub use pledge_types::{CyclicResolution, FutureId, FutureState, Reason};
