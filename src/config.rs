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

use crate::error::{OpgateError, Result};
use crate::signal::WaitTimeout;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "opgate.toml";
pub const ENV_PREFIX: &str = "OPGATE";
const DEFAULT_WORKER_NAME_PREFIX: &str = "opgate-worker";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OpgateConfig {
    #[serde(default)]
    pub worker: WorkerConfig,

    #[serde(default)]
    pub signal: SignalConfig,
}

/// Settings for the threads that run `GatedOperation::invoke_async`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_worker_name_prefix")]
    pub name_prefix: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_size: Option<usize>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name_prefix: default_worker_name_prefix(),
            stack_size: None,
        }
    }
}

fn default_worker_name_prefix() -> String {
    DEFAULT_WORKER_NAME_PREFIX.to_string()
}

/// When the asynchronous path creates the completion signal for a new run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SignalCreation {
    /// On the calling thread, before `invoke_async` returns.
    #[default]
    Eager,
    /// Inside the worker thread, once it starts running.
    Deferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SignalConfig {
    #[serde(default)]
    pub async_creation: SignalCreation,

    /// Timeout used by `CompletionHandle::wait_default`.
    #[serde(default)]
    pub default_wait: WaitTimeout,
}

impl OpgateConfig {
    /// Loads `opgate.toml` from `config_dir` (if present) and applies `OPGATE_*`
    /// environment overrides, e.g. `OPGATE_WORKER__NAME_PREFIX`.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            log::debug!("Config file not found at {config_path:?}, using defaults");
        }

        let settings = Config::builder()
            .add_source(
                File::from(config_path.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: OpgateConfig = settings.try_deserialize()?;
        config.validate()?;

        log::debug!("Loaded config from {config_path:?}");
        Ok(config)
    }

    pub fn save(&self, config_dir: &Path) -> Result<()> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        fs::create_dir_all(config_dir).map_err(|e| {
            OpgateError::InvalidConfig(format!("Failed to create {config_dir:?}: {e}"))
        })?;

        let contents = toml::to_string_pretty(self)
            .map_err(|e| OpgateError::InvalidConfig(format!("Failed to serialize config: {e}")))?;

        fs::write(&config_path, contents).map_err(|e| {
            OpgateError::InvalidConfig(format!("Failed to write {config_path:?}: {e}"))
        })?;
        log::debug!("Saved config to {config_path:?}");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let prefix = &self.worker.name_prefix;
        if prefix.trim().is_empty() {
            return Err(OpgateError::InvalidConfig(
                "worker.name_prefix must not be empty".to_string(),
            ));
        }
        if prefix.contains('\0') {
            return Err(OpgateError::InvalidConfig(
                "worker.name_prefix must not contain NUL bytes".to_string(),
            ));
        }
        if self.worker.stack_size == Some(0) {
            return Err(OpgateError::InvalidConfig(
                "worker.stack_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
