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

//! Mutex-gated execution.
//!
//! [`ExclusiveOperation`] serializes callers: every call to [`ExclusiveOperation::invoke`]
//! waits for the exclusion lock and then performs a full run. Nothing is coalesced.
//!
//! # Completion handles
//!
//! Each run replaces the completion signal before the operation starts. A handle taken
//! from [`ExclusiveOperation::done`] after a run has begun fires no later than that run
//! returns. A caller racing with the very first run may still get
//! [`OpgateError::SignalNotReady`](crate::error::OpgateError::SignalNotReady).

use crate::error::{OpgateError, Result};
use crate::guard::CompletionGuard;
use crate::observer::ExecutionObserver;
use crate::operation::{Operation, OperationParts};
use crate::signal::{CompletionHandle, CompletionSlot};
use log::trace;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

pub struct ExclusiveOperation {
    operation: Operation,
    exclusion: Mutex<()>,
    completion: CompletionSlot,
    observer: Arc<dyn ExecutionObserver>,
    label: Arc<str>,
}

impl ExclusiveOperation {
    pub fn new<F>(operation: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::from_parts(OperationParts::with_defaults(Arc::new(operation)))
    }

    /// Fails with [`OpgateError::OperationAbsent`] when `operation` is `None`.
    pub fn try_new(operation: Option<Operation>) -> Result<Self> {
        let operation = operation.ok_or(OpgateError::OperationAbsent)?;
        Ok(Self::from_parts(OperationParts::with_defaults(operation)))
    }

    pub(crate) fn from_parts(parts: OperationParts) -> Self {
        Self {
            operation: parts.operation,
            exclusion: Mutex::new(()),
            completion: CompletionSlot::new(&*parts.label, parts.config.signal.default_wait),
            observer: parts.observer,
            label: parts.label,
        }
    }

    /// Runs the operation once, blocking while another caller holds the exclusion lock.
    ///
    /// A panic in the operation propagates after the completion signal has fired and the
    /// lock has been released.
    pub fn invoke(&self) {
        trace!("{}: waiting for exclusion lock", self.label);
        // The lock guards no data, so a poisoned lock is still usable.
        let _exclusive = self
            .exclusion
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let signal = self.completion.replace();
        let mut completion = CompletionGuard::new(
            Some(signal),
            Arc::clone(&self.observer),
            Arc::clone(&self.label),
        );
        completion.start();

        (self.operation)();
    }

    /// Returns a handle to the signal of the most recently started run.
    pub fn done(&self) -> Result<CompletionHandle> {
        self.completion.handle()
    }

    pub fn is_ready(&self) -> bool {
        self.completion.is_ready()
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for ExclusiveOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExclusiveOperation")
            .field("label", &self.label)
            .field("ready", &self.is_ready())
            .finish()
    }
}
