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

//! One-shot broadcast completion signals.
//!
//! Every invocation of a gate creates a fresh [`CompletionSignal`] and stores it in a
//! [`CompletionSlot`]. Observers receive a read-only [`CompletionHandle`]; once the
//! signal fires, every handle pointing at it observes the completion, including
//! handles taken before a later invocation replaced the slot contents.

mod timeout;

pub use timeout::{WaitTimeout, WaitTimeoutParseError, parse_wait_timeout};

use crate::error::{OpgateError, Result};
use log::trace;
use std::sync::{Arc, Condvar, Mutex, PoisonError, RwLock};
use std::time::Duration;

#[derive(Debug, Default)]
struct SignalState {
    fired: Mutex<bool>,
    waiters: Condvar,
}

/// Owner side of a completion signal. Only the gate that created it may fire it.
#[derive(Debug, Clone, Default)]
pub(crate) struct CompletionSignal {
    state: Arc<SignalState>,
}

impl CompletionSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks the signal as complete and wakes every waiter. Firing twice is a no-op.
    pub(crate) fn fire(&self) {
        let mut fired = self
            .state
            .fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !*fired {
            *fired = true;
            self.state.waiters.notify_all();
        }
    }

    pub(crate) fn handle(&self, default_wait: WaitTimeout) -> CompletionHandle {
        CompletionHandle {
            state: Arc::clone(&self.state),
            default_wait,
        }
    }
}

/// Read-only view of a completion signal.
///
/// Handles are cheap to clone and may be shared between threads. A handle stays bound
/// to the signal it was created from; it does not follow later invocations.
#[derive(Debug, Clone)]
pub struct CompletionHandle {
    state: Arc<SignalState>,
    default_wait: WaitTimeout,
}

impl CompletionHandle {
    pub fn is_complete(&self) -> bool {
        *self
            .state
            .fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until the signal fires.
    pub fn wait(&self) {
        let fired = self
            .state
            .fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let _fired = self
            .state
            .waiters
            .wait_while(fired, |fired| !*fired)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Blocks until the signal fires or `timeout` elapses. Returns `true` if it fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let fired = self
            .state
            .fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (fired, _) = self
            .state
            .waiters
            .wait_timeout_while(fired, timeout, |fired| !*fired)
            .unwrap_or_else(PoisonError::into_inner);
        *fired
    }

    pub fn wait_for(&self, timeout: WaitTimeout) -> bool {
        match timeout {
            WaitTimeout::Infinite => {
                self.wait();
                true
            }
            WaitTimeout::Finite(duration) => self.wait_timeout(duration),
        }
    }

    /// Waits using the timeout configured on the gate that produced this handle.
    pub fn wait_default(&self) -> bool {
        self.wait_for(self.default_wait)
    }

    pub fn default_wait(&self) -> WaitTimeout {
        self.default_wait
    }

    /// Returns `true` when both handles observe the same invocation's signal.
    pub fn same_signal(&self, other: &CompletionHandle) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

/// Holds the signal of the most recently started invocation.
#[derive(Debug)]
pub(crate) struct CompletionSlot {
    label: String,
    current: RwLock<Option<CompletionSignal>>,
    default_wait: WaitTimeout,
}

impl CompletionSlot {
    pub(crate) fn new(label: impl Into<String>, default_wait: WaitTimeout) -> Self {
        Self {
            label: label.into(),
            current: RwLock::new(None),
            default_wait,
        }
    }

    /// Installs a fresh signal and returns the owner side of it.
    pub(crate) fn replace(&self) -> CompletionSignal {
        let signal = CompletionSignal::new();
        let mut current = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *current = Some(signal.clone());
        trace!("Replaced completion signal for {}", self.label);
        signal
    }

    pub(crate) fn handle(&self) -> Result<CompletionHandle> {
        let current = self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match current.as_ref() {
            Some(signal) => Ok(signal.handle(self.default_wait)),
            None => Err(OpgateError::SignalNotReady {
                label: self.label.clone(),
            }),
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
