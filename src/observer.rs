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

//! Observer interfaces for execution instrumentation.
//!
//! Observers let callers surface run and contention information (metrics, progress
//! output) without wrapping the operation itself. Hooks run on the thread that drives
//! the event and must not block for long.

use log::{debug, info};
use std::time::Duration;

/// Observer hooks for gate events.
///
/// Hooks must not panic. `on_completed` is skipped for runs whose operation panicked.
#[cfg_attr(test, mockall::automock)]
pub trait ExecutionObserver: Send + Sync {
    /// A call won the gate and the operation is about to run.
    fn on_started(&self, _label: &str) {}

    /// The operation body returned normally.
    fn on_completed(&self, _label: &str, _elapsed: Duration) {}

    /// A non-blocking call was turned away because a run was in progress.
    fn on_rejected(&self, _label: &str) {}
}

/// Observer implementation that performs no work.
#[derive(Debug, Default)]
pub struct NoopExecutionObserver;

impl ExecutionObserver for NoopExecutionObserver {}

/// Observer that reports every event through the `log` facade.
#[derive(Debug, Default)]
pub struct LoggingExecutionObserver;

impl ExecutionObserver for LoggingExecutionObserver {
    fn on_started(&self, label: &str) {
        debug!("{label}: run started");
    }

    fn on_completed(&self, label: &str, elapsed: Duration) {
        info!("{label}: run completed in {}", format_duration(elapsed));
    }

    fn on_rejected(&self, label: &str) {
        debug!("{label}: call rejected, run already in progress");
    }
}

pub(crate) fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
