//! Conformance scenarios.
//!
//! Each scenario builds its own [`TaskQueue`], drives it to idle and checks
//! the settled state. They are the runnable form of the properties every
//! Pledge build must hold.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result, bail, ensure};
use pledge_config::ConformanceConfig;
use pledge_core::{
    Future, LocalSetScheduler, OnFulfilled, OnRejected, Reason, Resolution, TaskQueue, Thenable,
    make_deferred,
};
use tokio::task;

pub struct Harness {
    conformance: ConformanceConfig,
    max_turns: Option<usize>,
}

impl Harness {
    pub fn new(conformance: ConformanceConfig, max_turns: Option<usize>) -> Self {
        Self {
            conformance,
            max_turns,
        }
    }

    fn queue(&self) -> TaskQueue {
        match self.max_turns {
            Some(max_turns) => TaskQueue::with_budget(max_turns),
            None => TaskQueue::new(),
        }
    }
}

pub struct Scenario {
    pub name: &'static str,
    run: fn(&Harness) -> Result<()>,
}

impl Scenario {
    pub fn run(&self, harness: &Harness) -> Result<()> {
        (self.run)(harness)
    }
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "exactly_once_settlement",
        run: exactly_once_settlement,
    },
    Scenario {
        name: "identity_round_trip",
        run: identity_round_trip,
    },
    Scenario {
        name: "deep_thenable_unwrapping",
        run: deep_thenable_unwrapping,
    },
    Scenario {
        name: "cyclic_self_resolution",
        run: cyclic_self_resolution,
    },
    Scenario {
        name: "all_of_preserves_order",
        run: all_of_preserves_order,
    },
    Scenario {
        name: "race_first_settle_wins",
        run: race_first_settle_wins,
    },
    Scenario {
        name: "handler_error_becomes_rejection",
        run: handler_error_becomes_rejection,
    },
    Scenario {
        name: "executor_error_becomes_rejection",
        run: executor_error_becomes_rejection,
    },
    Scenario {
        name: "malformed_thenable_rejects",
        run: malformed_thenable_rejects,
    },
];

/// Foreign thenable that unwraps into `depth` further thenables before
/// yielding `value`.
struct Nested {
    depth: usize,
    value: i64,
}

impl Thenable<i64, Reason> for Nested {
    fn then(
        &self,
        on_fulfilled: OnFulfilled<i64, Reason>,
        _on_rejected: OnRejected<Reason>,
    ) -> Result<(), Reason> {
        let next = match self.depth {
            0 => Resolution::Value(self.value),
            depth => Resolution::thenable(Nested {
                depth: depth - 1,
                value: self.value,
            }),
        };
        on_fulfilled(next);
        Ok(())
    }
}

/// Foreign thenable whose `then` fails after signalling fulfillment.
struct Broken {
    signal_first: bool,
}

impl Thenable<i64, Reason> for Broken {
    fn then(
        &self,
        on_fulfilled: OnFulfilled<i64, Reason>,
        _on_rejected: OnRejected<Reason>,
    ) -> Result<(), Reason> {
        if self.signal_first {
            on_fulfilled(Resolution::Value(1));
        }
        Err(Reason::from("then is broken"))
    }
}

fn exactly_once_settlement(harness: &Harness) -> Result<()> {
    let queue = harness.queue();
    let deferred = make_deferred::<i64, Reason>(&queue.handle());
    deferred.resolve.resolve(1);
    deferred.resolve.resolve(2);
    deferred.reject.reject("late".into());
    queue.run_until_idle()?;

    deferred.resolve.resolve(3);
    deferred.reject.reject("later".into());
    queue.run_until_idle()?;

    ensure!(
        deferred.future.outcome() == Some(Ok(1)),
        "expected Ok(1), got {:?}",
        deferred.future.outcome()
    );
    Ok(())
}

fn identity_round_trip(harness: &Harness) -> Result<()> {
    let queue = harness.queue();
    let handle = queue.handle();
    let values = [0_i64, -1, i64::MAX];
    let chained: Vec<_> = values
        .iter()
        .map(|&v| Future::<i64, Reason>::resolved_with(&handle, v).map(|x| x))
        .collect();
    queue.run_until_idle()?;

    for (expected, future) in values.iter().zip(&chained) {
        ensure!(
            future.value() == Some(*expected),
            "expected {expected}, got {:?}",
            future.outcome()
        );
    }
    Ok(())
}

fn deep_thenable_unwrapping(harness: &Harness) -> Result<()> {
    let depth = harness.conformance.chain_depth();
    let queue = harness.queue();
    let root: Future<i64, Reason> = Future::resolved_with(&queue.handle(), 0);
    let unwrapped: Future<i64, Reason> =
        root.then_ok(move |_| Ok(Resolution::thenable(Nested { depth, value: 77 })));
    queue.run_until_idle()?;

    ensure!(
        unwrapped.value() == Some(77),
        "depth {depth}: expected 77, got {:?}",
        unwrapped.outcome()
    );
    Ok(())
}

fn cyclic_self_resolution(harness: &Harness) -> Result<()> {
    let queue = harness.queue();
    let root: Future<i64, Reason> = Future::resolved_with(&queue.handle(), 0);
    let slot: Rc<RefCell<Option<Future<i64, Reason>>>> = Rc::new(RefCell::new(None));
    let lookup = Rc::clone(&slot);
    let derived = root.then_ok(move |_| match lookup.borrow().clone() {
        Some(me) => Ok(Resolution::from(me)),
        None => Err(Reason::from("derived future was not stored")),
    });
    *slot.borrow_mut() = Some(derived.clone());
    queue.run_until_idle()?;

    match derived.reason() {
        Some(reason) if reason.is_cyclic() => Ok(()),
        other => bail!("expected a cyclic rejection, got {other:?}"),
    }
}

fn all_of_preserves_order(harness: &Harness) -> Result<()> {
    let width = harness.conformance.width();
    let queue = harness.queue();
    let handle = queue.handle();
    let deferreds: Vec<_> = (0..width)
        .map(|_| make_deferred::<i64, Reason>(&handle))
        .collect();
    let all = Future::all_of(&handle, deferreds.iter().map(|d| d.future.clone()));

    for (index, deferred) in deferreds.iter().enumerate().rev() {
        deferred.resolve.resolve(index as i64 * 10);
        queue.run_until_idle()?;
    }

    let expected: Vec<i64> = (0..width).map(|index| index as i64 * 10).collect();
    ensure!(
        all.value().as_ref() == Some(&expected),
        "expected {expected:?}, got {:?}",
        all.outcome()
    );
    Ok(())
}

fn race_first_settle_wins(harness: &Harness) -> Result<()> {
    let width = harness.conformance.width();
    let queue = harness.queue();
    let handle = queue.handle();
    let deferreds: Vec<_> = (0..width)
        .map(|_| make_deferred::<i64, Reason>(&handle))
        .collect();
    let raced = Future::race(&handle, deferreds.iter().map(|d| d.future.clone()));

    let winner = deferreds.get(1).context("race needs at least two inputs")?;
    winner.resolve.resolve(42);
    for (index, deferred) in deferreds.iter().enumerate() {
        deferred.resolve.resolve(index as i64);
    }
    queue.run_until_idle()?;

    ensure!(
        raced.value() == Some(42),
        "expected 42, got {:?}",
        raced.outcome()
    );
    Ok(())
}

fn handler_error_becomes_rejection(harness: &Harness) -> Result<()> {
    let queue = harness.queue();
    let failed: Future<i64, Reason> =
        Future::<i64, Reason>::resolved_with(&queue.handle(), 1).then_ok(|_| Err("boom".into()));
    queue.run_until_idle()?;

    ensure!(
        failed.reason() == Some(Reason::from("boom")),
        "expected rejection with \"boom\", got {:?}",
        failed.outcome()
    );
    Ok(())
}

fn executor_error_becomes_rejection(harness: &Harness) -> Result<()> {
    let queue = harness.queue();
    let failed: Future<i64, Reason> =
        Future::new(&queue.handle(), |_, _| Err(Reason::from("executor failed")));
    queue.run_until_idle()?;

    ensure!(
        failed.reason() == Some(Reason::from("executor failed")),
        "expected executor rejection, got {:?}",
        failed.outcome()
    );
    Ok(())
}

fn malformed_thenable_rejects(harness: &Harness) -> Result<()> {
    let queue = harness.queue();
    let handle = queue.handle();
    let root: Future<i64, Reason> = Future::resolved_with(&handle, 0);
    let rejected: Future<i64, Reason> = root.then_ok(|_| {
        Ok(Resolution::thenable(Broken {
            signal_first: false,
        }))
    });
    let fulfilled: Future<i64, Reason> =
        root.then_ok(|_| Ok(Resolution::thenable(Broken { signal_first: true })));
    queue.run_until_idle()?;

    ensure!(
        rejected.reason() == Some(Reason::from("then is broken")),
        "expected the thenable error, got {:?}",
        rejected.outcome()
    );
    ensure!(
        fulfilled.value() == Some(1),
        "an error after a signal must be ignored, got {:?}",
        fulfilled.outcome()
    );
    Ok(())
}

/// Runs on the caller's tokio `LocalSet`, with tokio as the host scheduler.
pub async fn local_set_await() -> Result<()> {
    let handle = LocalSetScheduler::handle();
    let deferred = make_deferred::<i64, Reason>(&handle);
    let doubled = deferred.future.map(|value| value * 2);

    let resolve = deferred.resolve.clone();
    task::spawn_local(async move {
        resolve.resolve(21);
    });

    let outcome = doubled.settled().await;
    ensure!(outcome == Ok(42), "expected Ok(42), got {outcome:?}");
    Ok(())
}
