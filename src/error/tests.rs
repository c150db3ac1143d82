use crate::error::*;

#[test]
fn test_error_context_busy() {
    let error = OpgateError::Busy {
        label: "refresh".to_string(),
    };
    let context = ErrorContext::new(&error);

    assert!(context.suggestion.is_some());
    assert!(context.suggestion.unwrap().contains("done()"));
    assert!(context.details.unwrap().contains("'refresh'"));
}

#[test]
fn test_error_context_signal_not_ready() {
    let error = OpgateError::SignalNotReady {
        label: "sync".to_string(),
    };
    let context = ErrorContext::new(&error);

    assert!(context.suggestion.unwrap().contains("after an invocation has started"));
    assert!(context.details.unwrap().contains("'sync'"));
}

#[test]
fn test_error_context_operation_absent() {
    let context = ErrorContext::new(&OpgateError::OperationAbsent);

    assert!(context.suggestion.unwrap().contains("OperationBuilder::operation"));
    assert!(context.details.is_none());
}

#[test]
fn test_error_context_invalid_config() {
    let error = OpgateError::InvalidConfig("worker.name_prefix is empty".to_string());
    let context = ErrorContext::new(&error);

    assert!(context.suggestion.unwrap().contains("OPGATE_*"));
    assert_eq!(
        context.details,
        Some("worker.name_prefix is empty".to_string())
    );
}

#[test]
fn test_error_context_display() {
    let error = OpgateError::Busy {
        label: "op".to_string(),
    };
    let output = ErrorContext::new(&error).to_string();

    assert!(output.starts_with("Error: Operation 'op' is not available"));
    assert!(output.contains("Details:"));
    assert!(output.contains("Suggestion:"));
}

#[test]
fn test_error_predicates() {
    let busy = OpgateError::Busy {
        label: "op".to_string(),
    };
    let not_ready = OpgateError::SignalNotReady {
        label: "op".to_string(),
    };

    assert!(busy.is_busy());
    assert!(!busy.is_signal_not_ready());
    assert!(not_ready.is_signal_not_ready());
    assert!(!OpgateError::OperationAbsent.is_busy());
}

#[test]
fn test_worker_spawn_keeps_source() {
    use std::error::Error;

    let error = OpgateError::WorkerSpawn(std::io::Error::other("no threads left"));

    assert!(error.source().is_some());
    assert!(error.to_string().contains("no threads left"));
}
