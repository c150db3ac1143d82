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

//! State-gated execution.
//!
//! [`GatedOperation`] never queues callers. A call either wins the Idle→Running
//! transition and performs a run, or returns [`OpgateError::Busy`] at once.
//!
//! A run fires its completion signal and only then returns the gate to idle, so an
//! observer woken by the signal can briefly still see the gate as running.
//!
//! With [`SignalCreation::Deferred`] the asynchronous path creates the signal inside the
//! worker thread. Until the worker has started, [`GatedOperation::done`] reports
//! [`OpgateError::SignalNotReady`] (or returns the previous run's handle) even though
//! [`GatedOperation::invoke_async`] already succeeded.

use crate::config::{SignalCreation, WorkerConfig};
use crate::error::{OpgateError, Result};
use crate::guard::CompletionGuard;
use crate::observer::ExecutionObserver;
use crate::operation::{Operation, OperationParts};
use crate::signal::{CompletionHandle, CompletionSignal, CompletionSlot};
use crate::state::{RunState, RunStateCell};
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;
use std::thread;

/// Non-blocking, reusable gate around an operation.
///
/// Clones share the same gate.
#[derive(Clone)]
pub struct GatedOperation {
    inner: Arc<GatedInner>,
}

struct GatedInner {
    operation: Operation,
    state: RunStateCell,
    completion: CompletionSlot,
    observer: Arc<dyn ExecutionObserver>,
    label: Arc<str>,
    worker: WorkerConfig,
    signal_creation: SignalCreation,
}

impl GatedInner {
    fn try_enter(&self) -> Result<()> {
        if self.state.try_begin() {
            return Ok(());
        }

        debug!("{}: rejected, run already in progress", self.label);
        self.observer.on_rejected(&self.label);
        Err(OpgateError::Busy {
            label: self.label.to_string(),
        })
    }

    fn worker_name(&self) -> String {
        let name = format!("{}-{}", self.worker.name_prefix, self.label);
        name.replace('\0', "")
    }
}

/// A run that has won the gate. Dropping it fires the signal, then resets the gate.
struct ActiveRun {
    inner: Arc<GatedInner>,
    completion: Option<CompletionGuard>,
}

impl ActiveRun {
    fn new(inner: Arc<GatedInner>, signal: Option<CompletionSignal>) -> Self {
        let completion = CompletionGuard::new(
            signal,
            Arc::clone(&inner.observer),
            Arc::clone(&inner.label),
        );
        Self {
            inner,
            completion: Some(completion),
        }
    }

    fn run(mut self) {
        if let Some(completion) = self.completion.as_mut() {
            if !completion.has_signal() {
                completion.attach(self.inner.completion.replace());
            }
            completion.start();
        }

        (self.inner.operation)();
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        drop(self.completion.take());
        self.inner.state.finish();
    }
}

impl GatedOperation {
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
            inner: Arc::new(GatedInner {
                operation: parts.operation,
                state: RunStateCell::new(),
                completion: CompletionSlot::new(&*parts.label, parts.config.signal.default_wait),
                observer: parts.observer,
                label: parts.label,
                worker: parts.config.worker,
                signal_creation: parts.config.signal.async_creation,
            }),
        }
    }

    /// Runs the operation on the calling thread unless a run is already in progress.
    ///
    /// Returns [`OpgateError::Busy`] without blocking when the gate is taken. A panic in
    /// the operation propagates after the signal has fired and the gate is idle again.
    pub fn invoke_sync(&self) -> Result<()> {
        self.inner.try_enter()?;

        let signal = self.inner.completion.replace();
        ActiveRun::new(Arc::clone(&self.inner), Some(signal)).run();
        Ok(())
    }

    /// Schedules the operation on a new worker thread and returns immediately.
    ///
    /// Returns [`OpgateError::Busy`] when the gate is taken, or
    /// [`OpgateError::WorkerSpawn`] when the thread could not be started; in the latter
    /// case the gate is already idle again when the error is returned.
    pub fn invoke_async(&self) -> Result<()> {
        self.inner.try_enter()?;

        let signal = match self.inner.signal_creation {
            SignalCreation::Eager => Some(self.inner.completion.replace()),
            SignalCreation::Deferred => None,
        };
        let run = ActiveRun::new(Arc::clone(&self.inner), signal);

        let mut builder = thread::Builder::new().name(self.inner.worker_name());
        if let Some(stack_size) = self.inner.worker.stack_size {
            builder = builder.stack_size(stack_size);
        }

        // On failure the closure, and with it `run`, is dropped before spawn returns.
        match builder.spawn(move || run.run()) {
            Ok(_) => {
                debug!("{}: scheduled on worker thread", self.inner.label);
                Ok(())
            }
            Err(err) => {
                warn!("{}: failed to start worker thread: {err}", self.inner.label);
                Err(OpgateError::WorkerSpawn(err))
            }
        }
    }

    /// Returns a handle to the signal of the most recently started run.
    pub fn done(&self) -> Result<CompletionHandle> {
        self.inner.completion.handle()
    }

    pub fn state(&self) -> RunState {
        self.inner.state.load()
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    pub fn is_ready(&self) -> bool {
        self.inner.completion.is_ready()
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn signal_creation(&self) -> SignalCreation {
        self.inner.signal_creation
    }
}

impl fmt::Debug for GatedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatedOperation")
            .field("label", &self.inner.label)
            .field("state", &self.state())
            .field("ready", &self.is_ready())
            .finish()
    }
}
