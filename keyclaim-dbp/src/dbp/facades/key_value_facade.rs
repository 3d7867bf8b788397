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

//! Store facade for plain key-value operations.

use crate::coord::CoordinationError;
use crate::coord::TimeToLive;
use std::time::Duration;

/// Store facade for plain key-value operations.
#[async_trait::async_trait]
pub trait KeyValueFacade: Send + Sync {
    /// Return the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, CoordinationError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// When `time_to_live` is `None` the key will never expire.
    async fn set(
        &self,
        key: &str,
        value: &str,
        time_to_live: Option<Duration>,
    ) -> Result<(), CoordinationError>;

    /// Return `true` if `key` exists.
    async fn exists(&self, key: &str) -> Result<bool, CoordinationError>;

    /// Remove `key`.
    ///
    /// Returns `false` if there was nothing to remove.
    async fn delete(&self, key: &str) -> Result<bool, CoordinationError>;

    /// Set the time to live of an existing `key`.
    ///
    /// Returns `false` (and does nothing) if the key does not exist.
    async fn expire(&self, key: &str, time_to_live: Duration) -> Result<bool, CoordinationError>;

    /// Return the remaining time to live of `key`.
    async fn time_to_live(&self, key: &str) -> Result<TimeToLive, CoordinationError>;
}
