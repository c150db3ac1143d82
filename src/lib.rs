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

//! At-most-one execution of a wrapped operation, with broadcast completion signals.
//!
//! Two gates share the same completion contract and differ in how they exclude
//! concurrent callers:
//!
//! * [`ExclusiveOperation`] blocks callers until the current run finishes, then runs
//!   again for each of them.
//! * [`GatedOperation`] rejects callers with [`OpgateError::Busy`] while a run is in
//!   progress, and can run the operation on the calling thread or on a worker thread.
//!
//! Both expose `done()`, which hands out a [`CompletionHandle`] for the most recently
//! started run.

pub mod config;
pub mod error;
pub mod exclusive;
pub mod gated;
mod guard;
pub mod logging;
pub mod observer;
pub mod operation;
pub mod signal;
pub mod state;

pub use crate::config::{OpgateConfig, SignalConfig, SignalCreation, WorkerConfig};
pub use crate::error::{OpgateError, Result};
pub use crate::exclusive::ExclusiveOperation;
pub use crate::gated::GatedOperation;
pub use crate::observer::{ExecutionObserver, LoggingExecutionObserver, NoopExecutionObserver};
pub use crate::operation::{Operation, OperationBuilder, operation};
pub use crate::signal::{CompletionHandle, WaitTimeout, parse_wait_timeout};
pub use crate::state::RunState;
