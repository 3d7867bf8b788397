/*
    Copyright 2025 MydriaTech AB

    Licensed under the Apache License 2.0 with Free world makers exception
    1.0.0 (the "License"); you may not use this file except in compliance with
    the License. You should have obtained a copy of the License with the source
    or binary distribution in file named

        LICENSE-Apache-2.0-with-FWM-Exception-1.0.0

    Unless required by applicable law or agreed to in writing, software
    distributed under the License is distributed on an "AS IS" BASIS,
    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    See the License for the specific language governing permissions and
    limitations under the License.
*/

//! Storage of a single key.

use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;
use tokio::time::Instant;

/// A stored value and when it expires.
#[derive(Debug)]
pub struct InMemEntry {
    pub value: String,
    pub expires_at: Option<Instant>,
}

impl InMemEntry {
    /// Return a new instance that expires after `time_to_live` (if any).
    pub fn new(value: String, time_to_live: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: time_to_live.and_then(Self::expiry_after),
        }
    }

    /// Point in time `time_to_live` from now.
    ///
    /// A `time_to_live` too large to be represented never expires.
    pub fn expiry_after(time_to_live: Duration) -> Option<Instant> {
        Instant::now().checked_add(time_to_live)
    }

    /// Remaining time to live, `None` if the entry never expires.
    pub fn remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires_at| expires_at.saturating_duration_since(Instant::now()))
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

#[derive(Debug, Default)]
struct InMemSlotState {
    entry: Option<InMemEntry>,
    retired: bool,
}

/// Storage of a single key.
///
/// All access goes through [Self::with_live_entry] which never exposes an
/// expired entry. A slot that is left without an entry is retired and must
/// be replaced by a fresh slot before the key can be written again.
#[derive(Debug, Default)]
pub struct InMemSlot {
    state: Mutex<InMemSlotState>,
}

impl InMemSlot {
    /// Run `f` with exclusive access to the current (non-expired) entry.
    ///
    /// If `f` leaves the slot empty, the slot is retired and `retire` runs
    /// while the slot is still locked. A retired slot hands `f` back unused.
    pub fn with_live_entry<R, F>(&self, f: F, retire: impl FnOnce()) -> Result<R, F>
    where
        F: FnOnce(&mut Option<InMemEntry>) -> R,
    {
        // Nothing can be left half-updated by a panic in `f`, so a poisoned
        // lock is still usable.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.retired {
            return Err(f);
        }
        if state
            .entry
            .as_ref()
            .is_some_and(|current| current.is_expired(Instant::now()))
        {
            state.entry = None;
        }
        let ret = f(&mut state.entry);
        if state.entry.is_none() {
            state.retired = true;
            retire();
        }
        Ok(ret)
    }
}
