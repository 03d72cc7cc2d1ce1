//! Request lifecycle tests: single-flight, late results, validation gating.
//!
//! Uses a GatedAnalyzer so each test decides exactly when an analysis
//! finishes.

use std::sync::Arc;

use neuracare_core::analysis::{BurnoutAnalyzer, fallback_result};
use neuracare_core::lifecycle::{RequestController, SubmitOutcome, View};
use neuracare_core::validation::EntryError;
use neuracare_test_utils::{GatedAnalyzer, Reply, SAMPLE_ENTRY, ScriptedBackend, sample_result};

// ===========================================================================
// Helpers
// ===========================================================================

fn gated() -> (Arc<GatedAnalyzer>, RequestController) {
    let analyzer = Arc::new(GatedAnalyzer::new(sample_result()));
    let controller = RequestController::new(analyzer.clone());
    (analyzer, controller)
}

/// Yield until the analyzer has seen `n` calls.
async fn wait_for_calls(analyzer: &GatedAnalyzer, n: usize) {
    while analyzer.call_count() < n {
        tokio::task::yield_now().await;
    }
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[tokio::test]
async fn valid_entry_shows_results() {
    let (analyzer, controller) = gated();
    analyzer.release(1);

    controller.set_text(SAMPLE_ENTRY);
    let outcome = controller.submit().await;

    assert_eq!(outcome, SubmitOutcome::Completed);
    let snap = controller.snapshot();
    assert_eq!(snap.view, View::Results);
    assert!(!snap.in_flight);
    assert_eq!(snap.validation_error, None);

    let result = snap.result.expect("result is set");
    assert_eq!(*result, sample_result());
    let breathing: Vec<usize> = result.breathing_steps().map(|(i, _)| i).collect();
    assert_eq!(breathing, vec![1]);
    assert_eq!(analyzer.seen(), vec![SAMPLE_ENTRY.to_string()]);
}

#[tokio::test]
async fn surrounding_whitespace_is_not_sent() {
    let (analyzer, controller) = gated();
    analyzer.release(1);

    controller.set_text(format!("  \n{SAMPLE_ENTRY}\t "));
    assert_eq!(controller.submit().await, SubmitOutcome::Completed);
    assert_eq!(analyzer.seen(), vec![SAMPLE_ENTRY.to_string()]);
}

#[tokio::test]
async fn short_entry_never_reaches_analyzer() {
    let (analyzer, controller) = gated();

    controller.set_text("tired");
    let outcome = controller.submit().await;

    assert_eq!(outcome, SubmitOutcome::Invalid(EntryError::TooShort));
    assert_eq!(controller.validation_error(), Some(EntryError::TooShort));
    assert_eq!(controller.view(), View::Composing);
    assert!(!controller.is_in_flight());
    assert_eq!(analyzer.call_count(), 0);

    // Once an error shows, edits re-validate immediately.
    controller.set_text("tired of everything");
    assert_eq!(controller.validation_error(), None);
}

#[tokio::test]
async fn blank_entry_is_a_no_op() {
    let (analyzer, controller) = gated();

    controller.set_text("  \n ");
    assert_eq!(controller.submit().await, SubmitOutcome::Blank);
    assert_eq!(controller.validation_error(), None);
    assert_eq!(controller.view(), View::Composing);
    assert_eq!(analyzer.call_count(), 0);
}

#[tokio::test]
async fn long_entry_is_rejected() {
    let (analyzer, controller) = gated();

    controller.set_text("a".repeat(2001));
    assert_eq!(
        controller.submit().await,
        SubmitOutcome::Invalid(EntryError::TooLong)
    );
    assert_eq!(analyzer.call_count(), 0);
}

#[tokio::test]
async fn second_submit_while_in_flight_is_ignored() {
    let (analyzer, controller) = gated();
    controller.set_text(SAMPLE_ENTRY);

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    wait_for_calls(&analyzer, 1).await;
    assert!(controller.is_in_flight());

    assert_eq!(controller.submit().await, SubmitOutcome::Busy);
    assert_eq!(analyzer.call_count(), 1);

    analyzer.release(1);
    assert_eq!(first.await.unwrap(), SubmitOutcome::Completed);
    assert!(!controller.is_in_flight());
    assert_eq!(analyzer.call_count(), 1);
}

#[tokio::test]
async fn reset_discards_late_result() {
    let (analyzer, controller) = gated();
    controller.set_text(SAMPLE_ENTRY);

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    wait_for_calls(&analyzer, 1).await;

    controller.reset();
    analyzer.release(1);

    assert_eq!(pending.await.unwrap(), SubmitOutcome::Superseded);
    let snap = controller.snapshot();
    assert_eq!(snap.view, View::Composing);
    assert_eq!(snap.result, None);
    assert_eq!(snap.text, "");
    assert!(!snap.in_flight);
}

#[tokio::test]
async fn reset_mid_flight_keeps_single_call() {
    let (analyzer, controller) = gated();
    controller.set_text(SAMPLE_ENTRY);

    let stale = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    wait_for_calls(&analyzer, 1).await;
    controller.reset();

    // The indicator is gone, but the old call still occupies the analyzer.
    assert!(!controller.is_in_flight());
    assert!(controller.is_busy());

    controller.set_text("A different and much calmer entry.");
    assert_eq!(controller.submit().await, SubmitOutcome::Busy);
    assert_eq!(analyzer.call_count(), 1);
    assert_eq!(controller.view(), View::Composing);

    analyzer.release(1);
    assert_eq!(stale.await.unwrap(), SubmitOutcome::Superseded);
    assert!(!controller.is_busy());
    assert_eq!(controller.view(), View::Composing);

    // Once the old call has returned, the new entry goes through.
    analyzer.release(1);
    assert_eq!(controller.submit().await, SubmitOutcome::Completed);
    assert_eq!(analyzer.call_count(), 2);
    assert_eq!(analyzer.seen()[1], "A different and much calmer entry.");
    assert_eq!(analyzer.peak_concurrency(), 1);
    assert_eq!(controller.view(), View::Results);
}

#[tokio::test]
async fn repeated_resets_never_overlap_calls() {
    let (analyzer, controller) = gated();
    controller.set_text(SAMPLE_ENTRY);

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    wait_for_calls(&analyzer, 1).await;

    for _ in 0..3 {
        controller.reset();
        controller.set_text(SAMPLE_ENTRY);
        assert_eq!(controller.submit().await, SubmitOutcome::Busy);
    }

    analyzer.release(1);
    assert_eq!(first.await.unwrap(), SubmitOutcome::Superseded);
    assert_eq!(analyzer.call_count(), 1);
    assert_eq!(analyzer.peak_concurrency(), 1);
    assert_eq!(analyzer.active(), 0);
    assert!(!controller.is_busy());
    // The text typed after the last reset is still there to resubmit.
    assert_eq!(controller.text(), SAMPLE_ENTRY);
}

#[tokio::test]
async fn aborted_submit_releases_in_flight() {
    let (analyzer, controller) = gated();
    controller.set_text(SAMPLE_ENTRY);

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    wait_for_calls(&analyzer, 1).await;
    assert!(controller.is_in_flight());

    pending.abort();
    assert!(pending.await.unwrap_err().is_cancelled());
    assert!(!controller.is_in_flight());
    assert!(!controller.is_busy());
    assert_eq!(controller.view(), View::Composing);

    analyzer.release(1);
    assert_eq!(controller.submit().await, SubmitOutcome::Completed);
}

#[tokio::test]
async fn reset_from_results_returns_to_empty_composer() {
    let (analyzer, controller) = gated();
    analyzer.release(1);
    controller.set_text(SAMPLE_ENTRY);
    controller.submit().await;

    controller.reset();

    let snap = controller.snapshot();
    assert_eq!(snap.view, View::Composing);
    assert_eq!(snap.text, "");
    assert_eq!(snap.result, None);
    assert_eq!(snap.validation_error, None);
}

#[tokio::test]
async fn backend_failure_still_shows_results() {
    let backend = Arc::new(ScriptedBackend::new([Reply::Status(500)]));
    let controller = RequestController::new(Arc::new(BurnoutAnalyzer::new(backend.clone())));

    controller.set_text(SAMPLE_ENTRY);
    assert_eq!(controller.submit().await, SubmitOutcome::Completed);

    assert_eq!(controller.view(), View::Results);
    assert_eq!(
        controller.result().as_deref(),
        Some(&fallback_result())
    );
    assert_eq!(backend.call_count(), 1);
}
