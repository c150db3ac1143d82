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

#![allow(dead_code)]

pub mod run_log;

pub use run_log::{RunLog, RunSpan};

use opgate::GatedOperation;
use std::thread;
use std::time::{Duration, Instant};

/// Polls until the gate reports idle. A run fires its signal before resetting the gate.
pub fn wait_until_idle(gate: &GatedOperation, limit: Duration) {
    let deadline = Instant::now() + limit;
    while gate.is_running() {
        assert!(Instant::now() < deadline, "gate still running after {limit:?}");
        thread::sleep(Duration::from_millis(1));
    }
}
