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

//! Store facade for atomic counters.

use crate::coord::CoordinationError;

/// Store facade for atomic counters.
#[async_trait::async_trait]
pub trait CounterFacade: Send + Sync {
    /// Atomically increment the integer stored under `key` by one and return
    /// the new value.
    ///
    /// An absent key is created with the value `0` before the increment. An
    /// existing time to live of the key is left untouched.
    async fn increment(&self, key: &str) -> Result<i64, CoordinationError>;
}
