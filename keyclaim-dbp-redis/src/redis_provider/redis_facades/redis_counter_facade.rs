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

//! Redis implementation of [CounterFacade].

use crate::RedisProvider;
use crate::redis_provider::redis_commands::RedisCommands;
use keyclaim_dbp::coord::CoordinationError;
use keyclaim_dbp::dbp::facades::CounterFacade;
use std::sync::Arc;

/// Redis implementation of [CounterFacade].
pub struct RedisCounterFacade {
    redis_provider: Arc<RedisProvider>,
}

impl RedisCounterFacade {
    /// Return a new instance.
    pub fn new(redis_provider: &Arc<RedisProvider>) -> Self {
        Self {
            redis_provider: Arc::clone(redis_provider),
        }
    }
}

#[async_trait::async_trait]
impl CounterFacade for RedisCounterFacade {
    async fn increment(&self, key: &str) -> Result<i64, CoordinationError> {
        // INCR on a value that isn't an integer is an error reply and maps to
        // a protocol error.
        self.redis_provider
            .query(&RedisCommands::increment(key))
            .await
    }
}
