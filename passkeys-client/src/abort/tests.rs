use std::time::Duration;

use super::*;

#[tokio::test]
async fn abort_reaches_every_signal() {
    let controller = AbortController::new();
    let first = controller.signal();
    let second = first.clone();
    assert!(!first.is_aborted());

    controller.abort();

    assert!(controller.is_aborted());
    assert!(first.is_aborted());
    second.aborted().await;
}

#[tokio::test]
async fn signals_taken_after_abort_are_aborted() {
    let controller = AbortController::new();
    controller.abort();
    controller.signal().aborted().await;
}

#[tokio::test]
async fn dropped_controller_never_aborts() {
    let signal = AbortController::new().signal();
    let waited = tokio::time::timeout(Duration::from_millis(20), signal.aborted()).await;
    assert!(waited.is_err());
    assert!(!signal.is_aborted());
}
