//! resolved_with, rejected_with, race and all_of

use pledge_core::{Future, Reason, make_deferred};

use crate::common::{drain, fulfilled, queue, rejected};

#[test]
fn resolved_with_and_rejected_with_settle_after_a_turn() {
    let (queue, handle) = queue();
    let ok = fulfilled(&handle, 1);
    let err = rejected(&handle, "no");
    assert!(ok.is_pending());
    assert!(err.is_pending());

    drain(&queue);
    assert_eq!(ok.value(), Some(1));
    assert_eq!(err.reason(), Some(Reason::from("no")));
}

#[test]
fn race_takes_first_settled_value() {
    let (queue, handle) = queue();
    let slow = make_deferred::<i32, Reason>(&handle);
    let fast = make_deferred::<i32, Reason>(&handle);
    let raced = Future::race(&handle, [slow.future.clone(), fast.future.clone()]);

    fast.resolve.resolve(42);
    drain(&queue);
    slow.resolve.resolve(1);
    drain(&queue);

    assert_eq!(raced.value(), Some(42));
}

#[test]
fn race_takes_first_rejection() {
    let (queue, handle) = queue();
    let pending = make_deferred::<i32, Reason>(&handle);
    let raced = Future::race(
        &handle,
        [pending.future.clone(), rejected(&handle, "fast failure")],
    );
    drain(&queue);
    pending.resolve.resolve(1);
    drain(&queue);

    assert_eq!(raced.reason(), Some(Reason::from("fast failure")));
}

#[test]
fn race_with_no_inputs_stays_pending() {
    let (queue, handle) = queue();
    let raced: Future<i32, Reason> = Future::race(&handle, Vec::new());
    drain(&queue);

    assert!(raced.is_pending());
}

#[test]
fn all_of_keeps_input_order() {
    let (queue, handle) = queue();
    let inputs: Vec<_> = (0..5).map(|_| make_deferred::<i32, Reason>(&handle)).collect();
    let all = Future::all_of(&handle, inputs.iter().map(|d| d.future.clone()));

    for (index, deferred) in inputs.iter().enumerate().rev() {
        deferred.resolve.resolve(index as i32);
        drain(&queue);
        if index > 0 {
            assert!(all.is_pending());
        }
    }

    assert_eq!(all.value(), Some(vec![0, 1, 2, 3, 4]));
}

#[test]
fn all_of_rejects_on_first_rejection() {
    let (queue, handle) = queue();
    let pending = make_deferred::<i32, Reason>(&handle);
    let all = Future::all_of(
        &handle,
        [
            fulfilled(&handle, 1),
            rejected(&handle, "broken"),
            pending.future.clone(),
        ],
    );
    drain(&queue);

    assert_eq!(all.reason(), Some(Reason::from("broken")));
}

#[test]
fn all_of_empty_fulfills_with_empty_vec() {
    let (queue, handle) = queue();
    let all: Future<Vec<i32>, Reason> = Future::all_of(&handle, Vec::new());
    drain(&queue);

    assert_eq!(all.value(), Some(Vec::new()));
}
