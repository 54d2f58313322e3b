//! Foreign thenable adoption

use pledge_core::{Future, Reason, Resolution};

use crate::common::{Chaotic, Manual, SyncReason, SyncValue, Unchainable, drain, fulfilled, queue};

#[test]
fn synchronous_foreign_value_is_adopted() {
    let (queue, handle) = queue();
    let child: Future<i32, Reason> =
        fulfilled(&handle, 0).then_ok(|_| Ok(Resolution::thenable(SyncValue(5))));
    drain(&queue);

    assert_eq!(child.value(), Some(5));
}

#[test]
fn synchronous_foreign_rejection_is_adopted() {
    let (queue, handle) = queue();
    let child: Future<i32, Reason> =
        fulfilled(&handle, 0).then_ok(|_| Ok(Resolution::thenable(SyncReason("foreign"))));
    drain(&queue);

    assert_eq!(child.reason(), Some(Reason::from("foreign")));
}

#[test]
fn first_signal_wins_over_later_ones() {
    let (queue, handle) = queue();
    let child: Future<i32, Reason> =
        fulfilled(&handle, 0).then_ok(|_| Ok(Resolution::thenable(Chaotic)));
    drain(&queue);

    assert_eq!(child.reason(), Some(Reason::from("first")));
}

#[test]
fn then_failure_rejects_with_its_error() {
    let (queue, handle) = queue();
    let child: Future<i32, Reason> =
        fulfilled(&handle, 0).then_ok(|_| Ok(Resolution::thenable(Unchainable)));
    drain(&queue);

    assert_eq!(child.reason(), Some(Reason::from("cannot chain")));
}

#[test]
fn asynchronous_foreign_thenable_is_awaited() {
    let (queue, handle) = queue();
    let manual = Manual::default();
    let foreign = manual.clone();
    let child: Future<i32, Reason> =
        fulfilled(&handle, 0).then_ok(move |_| Ok(Resolution::thenable(foreign)));
    drain(&queue);
    assert_eq!(manual.calls(), 1);
    assert!(child.is_pending());

    manual.fulfill(Resolution::Value(30));
    drain(&queue);
    assert_eq!(child.value(), Some(30));
}

#[test]
fn foreign_thenable_resolving_to_thenable_is_unwrapped() {
    let (queue, handle) = queue();
    let manual = Manual::default();
    let foreign = manual.clone();
    let child: Future<i32, Reason> =
        fulfilled(&handle, 0).then_ok(move |_| Ok(Resolution::thenable(foreign)));
    drain(&queue);

    let pledge = fulfilled(&handle, 8);
    manual.fulfill(Resolution::from(pledge));
    drain(&queue);
    assert_eq!(child.value(), Some(8));
}

#[test]
fn asynchronous_foreign_rejection() {
    let (queue, handle) = queue();
    let manual = Manual::default();
    let foreign = manual.clone();
    let child: Future<i32, Reason> =
        fulfilled(&handle, 0).then_ok(move |_| Ok(Resolution::thenable(foreign)));
    drain(&queue);

    manual.reject("later");
    drain(&queue);
    assert_eq!(child.reason(), Some(Reason::from("later")));
}

#[test]
fn resolver_follow_adopts_foreign_thenable() {
    let (queue, handle) = queue();
    let deferred = pledge_core::make_deferred::<i32, Reason>(&handle);
    deferred.resolve.follow(Resolution::thenable(SyncValue(64)));
    deferred.resolve.resolve(1);
    drain(&queue);

    assert_eq!(deferred.future.value(), Some(64));
}
