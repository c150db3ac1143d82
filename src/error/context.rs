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

use crate::error::OpgateError;
use std::fmt;

pub struct ErrorContext<'a> {
    pub error: &'a OpgateError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a OpgateError) -> Self {
        let (suggestion, details) = match error {
            OpgateError::OperationAbsent => {
                let suggestion = Some(
                    "Pass a closure to OperationBuilder::operation before calling build."
                        .to_string(),
                );
                (suggestion, None)
            }
            OpgateError::Busy { label } => {
                let suggestion = Some(
                    "Wait on the handle returned by done() and try again, or use an \
                     ExclusiveOperation if callers should queue instead of being rejected."
                        .to_string(),
                );
                let details = Some(format!(
                    "'{label}' rejects concurrent calls without blocking; the running call \
                     was not affected."
                ));
                (suggestion, details)
            }
            OpgateError::SignalNotReady { label } => {
                let suggestion = Some(
                    "Call done() after an invocation has started. With deferred signal \
                     creation, wait until the worker thread has begun running."
                        .to_string(),
                );
                let details = Some(format!("'{label}' has not started any run yet."));
                (suggestion, details)
            }
            OpgateError::WorkerSpawn(err) => {
                let suggestion = Some(
                    "Check the process thread limits or lower worker.stack_size in the \
                     configuration."
                        .to_string(),
                );
                let details = Some(format!("Thread builder reported: {err}"));
                (suggestion, details)
            }
            OpgateError::InvalidConfig(msg) => {
                let suggestion = Some(
                    "Review the [worker] and [signal] sections of the configuration file and \
                     any OPGATE_* environment variables."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            OpgateError::Config(_) => {
                let suggestion = Some(
                    "Ensure the configuration file is valid TOML and that OPGATE_* variables \
                     use '__' between section and key (e.g. OPGATE_WORKER__NAME_PREFIX)."
                        .to_string(),
                );
                (suggestion, None)
            }
        };

        ErrorContext {
            error,
            suggestion,
            details,
        }
    }
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
