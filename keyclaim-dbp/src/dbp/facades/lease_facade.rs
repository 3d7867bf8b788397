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

//! Store facade for ownership guarded keys.

use crate::coord::CoordinationError;
use std::time::Duration;

/** Store facade for ownership guarded keys.

Each operation must be a single indivisible operation in the store. A
substitute store that can't provide this breaks mutual exclusion.
*/
#[async_trait::async_trait]
pub trait LeaseFacade: Send + Sync {
    /// Store `value` under `key` with the `time_to_live` applied as part of the
    /// same operation, but only if the key does not already exist.
    ///
    /// Returns `true` if the value was stored.
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        time_to_live: Duration,
    ) -> Result<bool, CoordinationError>;

    /// Remove `key` only if its current value equals `expected`.
    ///
    /// Returns `true` if the key was removed.
    async fn compare_and_delete(&self, key: &str, expected: &str)
    -> Result<bool, CoordinationError>;

    /// Replace the time to live of `key` only if its current value equals
    /// `expected`.
    ///
    /// Returns `true` if the time to live was replaced.
    async fn compare_and_expire(
        &self,
        key: &str,
        expected: &str,
        time_to_live: Duration,
    ) -> Result<bool, CoordinationError>;
}
