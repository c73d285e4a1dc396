//! Batch retriever scenarios through the public API

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use folio_feed::retrieve::{BatchError, BatchRetriever, FailureCause, RetryPolicy};

use crate::support::{error_body, monthly_body, note_body, symbols, ScriptedProvider};

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        backoff: Duration::ZERO,
        ..RetryPolicy::default()
    }
}

#[tokio::test]
async fn rate_limited_attempt_recovers_on_retry() {
    // Soft "Note" on attempt 1, clean body on attempt 2: the symbol
    // succeeds using the second attempt's data, attempts recorded as 2.
    let provider = ScriptedProvider::default()
        .script("AAA", vec![note_body(), monthly_body("AAA", 12)]);
    let retriever = BatchRetriever::with_policy(provider, fast_policy());

    let batch = retriever
        .monthly_batch(&symbols(&["AAA"]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(batch.series.len(), 1);
    assert_eq!(batch.series[0].len(), 12);
    assert_eq!(batch.attempts["AAA"], 2);
}

#[tokio::test]
async fn transport_outage_consumes_only_own_budget() {
    let provider = ScriptedProvider::default()
        .script("DOWN", vec![None, None, None])
        .script("UP", vec![monthly_body("UP", 12)]);
    let retriever = BatchRetriever::with_policy(provider, fast_policy());

    let batch = retriever
        .monthly_batch(&symbols(&["DOWN", "UP"]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].attempts, 3);
    assert_eq!(batch.attempts["UP"], 1);
    assert!(matches!(batch.failures[0].cause, FailureCause::Fetch(_)));
}

#[tokio::test]
async fn budget_abort_reports_every_symbol_cause() {
    let mut provider = ScriptedProvider::default();
    for name in ["F1", "F2", "F3", "F4", "F5", "F6"] {
        provider = provider.script(name, vec![error_body()]);
    }
    let retriever = BatchRetriever::with_policy(provider, fast_policy());

    let error = retriever
        .monthly_batch(
            &symbols(&["F1", "F2", "F3", "F4", "F5", "F6"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    let message = error.to_string();
    for name in ["F1", "F2", "F3", "F4", "F5", "F6"] {
        assert!(message.contains(name), "missing {name} in: {message}");
    }
    assert!(matches!(error, BatchError::BudgetExceeded { .. }));
}
