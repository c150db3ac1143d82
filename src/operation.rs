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

use crate::config::OpgateConfig;
use crate::error::{OpgateError, Result};
use crate::exclusive::ExclusiveOperation;
use crate::gated::GatedOperation;
use crate::observer::{ExecutionObserver, NoopExecutionObserver};
use std::fmt;
use std::sync::Arc;

/// Opaque unit of work wrapped by a gate. Shared read-only by every call.
pub type Operation = Arc<dyn Fn() + Send + Sync + 'static>;

pub const DEFAULT_LABEL: &str = "operation";

/// Wraps a closure as an [`Operation`].
pub fn operation<F>(f: F) -> Operation
where
    F: Fn() + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Builds either gate flavour from an operation, a label, an observer, and configuration.
pub struct OperationBuilder {
    operation: Option<Operation>,
    label: String,
    observer: Arc<dyn ExecutionObserver>,
    config: OpgateConfig,
}

impl OperationBuilder {
    pub fn new() -> Self {
        Self {
            operation: None,
            label: DEFAULT_LABEL.to_string(),
            observer: Arc::new(NoopExecutionObserver),
            config: OpgateConfig::default(),
        }
    }

    pub fn operation<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.operation = Some(Arc::new(f));
        self
    }

    pub fn shared_operation(mut self, operation: Option<Operation>) -> Self {
        self.operation = operation;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(mut self, config: OpgateConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build_exclusive(self) -> Result<ExclusiveOperation> {
        Ok(ExclusiveOperation::from_parts(self.into_parts()?))
    }

    pub fn build_gated(self) -> Result<GatedOperation> {
        Ok(GatedOperation::from_parts(self.into_parts()?))
    }

    fn into_parts(self) -> Result<OperationParts> {
        let operation = self.operation.ok_or(OpgateError::OperationAbsent)?;
        self.config.validate()?;
        Ok(OperationParts {
            operation,
            label: Arc::from(self.label),
            observer: self.observer,
            config: self.config,
        })
    }
}

impl Default for OperationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OperationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationBuilder")
            .field("has_operation", &self.operation.is_some())
            .field("label", &self.label)
            .field("config", &self.config)
            .finish()
    }
}

/// Validated builder output consumed by the gate constructors.
pub(crate) struct OperationParts {
    pub(crate) operation: Operation,
    pub(crate) label: Arc<str>,
    pub(crate) observer: Arc<dyn ExecutionObserver>,
    pub(crate) config: OpgateConfig,
}

impl OperationParts {
    pub(crate) fn with_defaults(operation: Operation) -> Self {
        Self {
            operation,
            label: Arc::from(DEFAULT_LABEL),
            observer: Arc::new(NoopExecutionObserver),
            config: OpgateConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn build_without_operation_fails() {
        let err = OperationBuilder::new().build_exclusive().unwrap_err();
        assert!(matches!(err, OpgateError::OperationAbsent));

        let err = OperationBuilder::new()
            .shared_operation(None)
            .build_gated()
            .unwrap_err();
        assert!(matches!(err, OpgateError::OperationAbsent));
    }

    #[test]
    fn build_rejects_invalid_config() {
        let mut config = OpgateConfig::default();
        config.worker.name_prefix = String::new();

        let err = OperationBuilder::new()
            .operation(|| {})
            .config(config)
            .build_gated()
            .unwrap_err();
        assert!(matches!(err, OpgateError::InvalidConfig(_)));
    }

    #[test]
    fn builder_carries_label_and_operation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let gate = OperationBuilder::new()
            .label("refresh-index")
            .shared_operation(Some(operation(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })))
            .build_exclusive()
            .unwrap();

        assert_eq!(gate.label(), "refresh-index");
        gate.invoke();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn debug_hides_closure() {
        let builder = OperationBuilder::new().operation(|| {});
        let rendered = format!("{builder:?}");
        assert!(rendered.contains("has_operation: true"));
        assert!(rendered.contains("label: \"operation\""));
    }
}
