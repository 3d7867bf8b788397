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

//! Strictly increasing counters with expiry armed on first use.

use keyclaim_dbp::coord::CoordinationError;
use keyclaim_dbp::coord::CoordinationErrorKind;
use keyclaim_dbp::dbp::StoreProvider;
use std::sync::Arc;
use std::time::Duration;

/**
Allocates strictly increasing values from named counters.

The store increments atomically, so concurrent callers of the same counter
never see the same value. Expiry is armed by the caller that observed `1`.

Incrementing and arming expiry are two separate store calls. If the process
dies in between, the counter never expires and keeps counting across what
should have been separate lifetimes. This window is accepted.
*/
pub struct AtomicCounterAllocator {
    store: Arc<StoreProvider>,
}

impl AtomicCounterAllocator {
    /// Return a new instance.
    pub fn new(store: &Arc<StoreProvider>) -> Self {
        Self {
            store: Arc::clone(store),
        }
    }

    /// Return the next value of the counter `counter_key`.
    ///
    /// The first allocation (returning `1`) sets the expiry of the counter to
    /// `time_to_live`. Later allocations leave the expiry untouched.
    pub async fn allocate(
        &self,
        counter_key: &str,
        time_to_live: Duration,
    ) -> Result<u64, CoordinationError> {
        if time_to_live.is_zero() {
            Err(CoordinationErrorKind::InvalidArgument
                .error_with_msg(format!("Counter '{counter_key}' needs a non-zero ttl.")))?;
        }
        let value = self.store.increment(counter_key).await?;
        let value = u64::try_from(value)
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| {
                CoordinationErrorKind::StoreProtocolError.error_with_msg(format!(
                    "Counter '{counter_key}' was incremented to {value}."
                ))
            })?;
        if value == 1 {
            let armed = self.store.expire(counter_key, time_to_live).await?;
            if armed {
                if log::log_enabled!(log::Level::Debug) {
                    log::debug!(
                        "Counter '{counter_key}' will expire in {} s.",
                        time_to_live.as_secs()
                    );
                }
            } else {
                // Expired or deleted between the two calls.
                log::warn!("Counter '{counter_key}' was gone before expiry could be set.");
            }
        }
        Ok(value)
    }

    /// Return the last allocated value of `counter_key` or `0` when no value
    /// has been allocated (or the counter has expired).
    pub async fn current(&self, counter_key: &str) -> Result<u64, CoordinationError> {
        self.store
            .get(counter_key)
            .await?
            .map(|value| {
                value.parse::<u64>().map_err(|e| {
                    CoordinationErrorKind::StoreProtocolError.error_with_msg(format!(
                        "Counter '{counter_key}' holds non-counter value '{value}': {e}"
                    ))
                })
            })
            .transpose()
            .map(Option::unwrap_or_default)
    }
}
