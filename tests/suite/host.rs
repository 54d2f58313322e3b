//! tokio LocalSet hosting and the await bridge

use pledge_core::{Future, LocalSetScheduler, Reason, Resolution, make_deferred};
use tokio::task::LocalSet;

#[tokio::test]
async fn chained_future_awaits_on_local_set() {
    let local = LocalSet::new();
    let outcome = local
        .run_until(async {
            let handle = LocalSetScheduler::handle();
            let future: Future<i32, Reason> = Future::resolved_with(&handle, 2);
            future
                .map(|value| value * 10)
                .then_ok(|value| Ok(Resolution::Value(value + 1)))
                .settled()
                .await
        })
        .await;

    assert_eq!(outcome, Ok(21));
}

#[tokio::test]
async fn all_of_across_local_tasks() {
    let local = LocalSet::new();
    let outcome = local
        .run_until(async {
            let handle = LocalSetScheduler::handle();
            let inputs: Vec<_> = (0..3).map(|_| make_deferred::<i32, Reason>(&handle)).collect();
            let all = Future::all_of(&handle, inputs.iter().map(|d| d.future.clone()));
            for (index, deferred) in inputs.into_iter().enumerate() {
                tokio::task::spawn_local(async move {
                    tokio::task::yield_now().await;
                    deferred.resolve.resolve(index as i32);
                });
            }
            all.settled().await
        })
        .await;

    assert_eq!(outcome, Ok(vec![0, 1, 2]));
}

#[tokio::test]
async fn deferred_settled_from_another_local_task() {
    let local = LocalSet::new();
    let outcome = local
        .run_until(async {
            let handle = LocalSetScheduler::handle();
            let deferred = make_deferred::<i32, Reason>(&handle);
            let reject = deferred.reject.clone();
            tokio::task::spawn_local(async move {
                reject.reject("remote".into());
            });
            deferred.future.settled().await
        })
        .await;

    assert_eq!(outcome, Err(Reason::from("remote")));
}

#[tokio::test]
async fn rejection_surfaces_as_err() {
    let local = LocalSet::new();
    let outcome = local
        .run_until(async {
            let handle = LocalSetScheduler::handle();
            let future: Future<i32, Reason> = Future::rejected_with(&handle, "host".into());
            future.settled().await
        })
        .await;

    assert_eq!(outcome, Err(Reason::from("host")));
}
