use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Enter/exit timestamps of a single run of an operation.
#[derive(Debug, Clone, Copy)]
pub struct RunSpan {
    pub entered: Instant,
    pub exited: Instant,
}

/// Records every run of an operation so tests can assert on overlap and counts.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    spans: Arc<Mutex<Vec<RunSpan>>>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `body` and records when it entered and exited.
    pub fn record<F: FnOnce()>(&self, body: F) {
        let entered = Instant::now();
        body();
        let exited = Instant::now();
        self.spans.lock().unwrap().push(RunSpan { entered, exited });
    }

    pub fn count(&self) -> usize {
        self.spans.lock().unwrap().len()
    }

    pub fn spans(&self) -> Vec<RunSpan> {
        let mut spans = self.spans.lock().unwrap().clone();
        spans.sort_by_key(|span| span.entered);
        spans
    }

    /// Panics if any two recorded runs overlapped in time.
    pub fn assert_no_overlap(&self) {
        let spans = self.spans();
        for pair in spans.windows(2) {
            assert!(
                pair[0].exited <= pair[1].entered,
                "runs overlapped: {:?} then {:?}",
                pair[0],
                pair[1]
            );
        }
    }
}
