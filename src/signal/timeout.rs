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

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;
use thiserror::Error;

const INFINITE: &str = "infinite";

/// How long an observer is willing to wait for a completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitTimeout {
    Finite(Duration),
    #[default]
    Infinite,
}

impl WaitTimeout {
    pub const fn from_secs(seconds: u64) -> Self {
        Self::Finite(Duration::from_secs(seconds))
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self::Finite(Duration::from_millis(millis))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Wait timeout '{value}' must be whole seconds or 'infinite'")]
pub struct WaitTimeoutParseError {
    value: String,
}

/// Parses `"infinite"` (any case) or a whole number of seconds.
pub fn parse_wait_timeout(value: &str) -> Result<WaitTimeout, WaitTimeoutParseError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case(INFINITE) {
        Ok(WaitTimeout::Infinite)
    } else {
        trimmed
            .parse::<u64>()
            .map(WaitTimeout::from_secs)
            .map_err(|_| WaitTimeoutParseError {
                value: trimmed.to_string(),
            })
    }
}

impl Serialize for WaitTimeout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WaitTimeout::Infinite => serializer.serialize_str(INFINITE),
            WaitTimeout::Finite(duration) => {
                serializer.serialize_str(&duration.as_secs().to_string())
            }
        }
    }
}

impl<'de> Deserialize<'de> for WaitTimeout {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_wait_timeout(&raw).map_err(serde::de::Error::custom)
    }
}
