// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::observer::{ExecutionObserver, format_duration};
use crate::signal::CompletionSignal;
use log::{debug, warn};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// RAII guard that fires a run's completion signal when dropped.
///
/// Fires on normal return and while unwinding from a panicking operation.
pub(crate) struct CompletionGuard {
    signal: Option<CompletionSignal>,
    observer: Arc<dyn ExecutionObserver>,
    label: Arc<str>,
    started_at: Option<Instant>,
}

impl CompletionGuard {
    pub(crate) fn new(
        signal: Option<CompletionSignal>,
        observer: Arc<dyn ExecutionObserver>,
        label: Arc<str>,
    ) -> Self {
        Self {
            signal,
            observer,
            label,
            started_at: None,
        }
    }

    /// Records the start of the operation body and notifies the observer.
    pub(crate) fn start(&mut self) {
        debug!("{}: run started", self.label);
        self.started_at = Some(Instant::now());
        self.observer.on_started(&self.label);
    }

    /// Attaches a signal created after the guard, as the deferred async path does.
    pub(crate) fn attach(&mut self, signal: CompletionSignal) {
        self.signal = Some(signal);
    }

    pub(crate) fn has_signal(&self) -> bool {
        self.signal.is_some()
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.take() {
            signal.fire();
        }

        // A run that never started (worker failed to spawn) only releases its signal.
        let Some(started_at) = self.started_at else {
            debug!("{}: completion signalled without a run", self.label);
            return;
        };

        let elapsed = started_at.elapsed();
        if thread::panicking() {
            // A second panic from the hook would abort the process.
            warn!(
                "{}: operation panicked after {}",
                self.label,
                format_duration(elapsed)
            );
            return;
        }

        debug!(
            "{}: run completed after {}",
            self.label,
            format_duration(elapsed)
        );
        self.observer.on_completed(&self.label, elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{MockExecutionObserver, NoopExecutionObserver};
    use crate::signal::WaitTimeout;
    use std::panic::{self, AssertUnwindSafe};

    fn guard_for(signal: Option<CompletionSignal>) -> CompletionGuard {
        CompletionGuard::new(signal, Arc::new(NoopExecutionObserver), Arc::from("guard"))
    }

    #[test]
    fn drop_fires_signal() {
        let signal = CompletionSignal::new();
        let handle = signal.handle(WaitTimeout::Infinite);
        {
            let mut guard = guard_for(Some(signal));
            guard.start();
            assert!(guard.has_signal());
            assert!(!handle.is_complete());
        }
        assert!(handle.is_complete());
    }

    #[test]
    fn attached_signal_fires() {
        let signal = CompletionSignal::new();
        let handle = signal.handle(WaitTimeout::Infinite);
        let mut guard = guard_for(None);
        assert!(!guard.has_signal());
        guard.attach(signal);
        drop(guard);
        assert!(handle.is_complete());
    }

    #[test]
    fn unwinding_fires_signal() {
        let signal = CompletionSignal::new();
        let handle = signal.handle(WaitTimeout::Infinite);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut guard = guard_for(Some(signal));
            guard.start();
            panic!("operation failed");
        }));

        assert!(result.is_err());
        assert!(handle.is_complete());
    }

    #[test]
    fn unwinding_skips_completion_hook() {
        let mut observer = MockExecutionObserver::new();
        observer.expect_on_started().times(1).return_const(());
        observer.expect_on_completed().never();
        let observer: Arc<dyn ExecutionObserver> = Arc::new(observer);

        let signal = CompletionSignal::new();
        let handle = signal.handle(WaitTimeout::Infinite);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut guard = CompletionGuard::new(Some(signal), observer, Arc::from("guard"));
            guard.start();
            panic!("operation failed");
        }));

        assert!(result.is_err());
        assert!(handle.is_complete());
    }

    #[test]
    fn observer_sees_started_runs_only() {
        let mut observer = MockExecutionObserver::new();
        observer
            .expect_on_started()
            .withf(|label| label.starts_with("guard"))
            .times(1)
            .return_const(());
        observer.expect_on_completed().times(1).return_const(());
        let observer: Arc<dyn ExecutionObserver> = Arc::new(observer);

        drop(CompletionGuard::new(None, Arc::clone(&observer), Arc::from("guard")));

        let mut started = CompletionGuard::new(None, observer, Arc::from("guard"));
        started.start();
        drop(started);
    }
}
