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

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

const IDLE: u8 = 0;
const RUNNING: u8 = 1;

/// Run state of a gated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

impl RunState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            RUNNING => RunState::Running,
            _ => RunState::Idle,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => f.write_str("idle"),
            RunState::Running => f.write_str("running"),
        }
    }
}

/// Atomic two-state flag. Idle→Running only through [`RunStateCell::try_begin`].
#[derive(Debug, Default)]
pub(crate) struct RunStateCell {
    raw: AtomicU8,
}

impl RunStateCell {
    pub(crate) fn new() -> Self {
        Self {
            raw: AtomicU8::new(IDLE),
        }
    }

    /// Returns `true` for exactly one caller among racers while the cell is idle.
    pub(crate) fn try_begin(&self) -> bool {
        self.raw
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn finish(&self) {
        self.raw.store(IDLE, Ordering::Release);
    }

    pub(crate) fn load(&self) -> RunState {
        RunState::from_raw(self.raw.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn starts_idle() {
        let cell = RunStateCell::new();
        assert_eq!(cell.load(), RunState::Idle);
        assert_eq!(RunState::default(), RunState::Idle);
    }

    #[test]
    fn second_begin_fails_until_finish() {
        let cell = RunStateCell::new();
        assert!(cell.try_begin());
        assert_eq!(cell.load(), RunState::Running);
        assert!(!cell.try_begin());

        cell.finish();
        assert_eq!(cell.load(), RunState::Idle);
        assert!(cell.try_begin());
    }

    #[test]
    fn exactly_one_racer_wins() {
        let cell = Arc::new(RunStateCell::new());
        let barrier = Arc::new(Barrier::new(16));

        let racers: Vec<_> = (0..16)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cell.try_begin()
                })
            })
            .collect();

        let winners = racers
            .into_iter()
            .map(|racer| racer.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn display_labels() {
        assert_eq!(RunState::Idle.to_string(), "idle");
        assert_eq!(RunState::Running.to_string(), "running");
    }
}
