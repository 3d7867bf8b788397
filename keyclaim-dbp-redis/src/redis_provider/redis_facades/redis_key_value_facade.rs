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

//! Redis implementation of [KeyValueFacade].

use crate::RedisProvider;
use crate::RedisResultMapper;
use crate::redis_provider::redis_commands::RedisCommands;
use keyclaim_dbp::coord::CoordinationError;
use keyclaim_dbp::coord::TimeToLive;
use keyclaim_dbp::dbp::facades::KeyValueFacade;
use std::sync::Arc;
use std::time::Duration;

/// Redis implementation of [KeyValueFacade].
pub struct RedisKeyValueFacade {
    redis_provider: Arc<RedisProvider>,
}

impl RedisKeyValueFacade {
    /// Return a new instance.
    pub fn new(redis_provider: &Arc<RedisProvider>) -> Self {
        Self {
            redis_provider: Arc::clone(redis_provider),
        }
    }
}

#[async_trait::async_trait]
impl KeyValueFacade for RedisKeyValueFacade {
    async fn get(&self, key: &str) -> Result<Option<String>, CoordinationError> {
        self.redis_provider.query(&RedisCommands::get(key)).await
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        time_to_live: Option<Duration>,
    ) -> Result<(), CoordinationError> {
        self.redis_provider
            .query(&RedisCommands::set(key, value, time_to_live))
            .await
    }

    async fn exists(&self, key: &str) -> Result<bool, CoordinationError> {
        let count: i64 = self
            .redis_provider
            .query(&RedisCommands::exists(key))
            .await?;
        Ok(count > 0)
    }

    async fn delete(&self, key: &str) -> Result<bool, CoordinationError> {
        let count: i64 = self.redis_provider.query(&RedisCommands::delete(key)).await?;
        Ok(count > 0)
    }

    async fn expire(&self, key: &str, time_to_live: Duration) -> Result<bool, CoordinationError> {
        let reply: i64 = self
            .redis_provider
            .query(&RedisCommands::expire(key, time_to_live))
            .await?;
        RedisResultMapper::into_flag(reply)
    }

    async fn time_to_live(&self, key: &str) -> Result<TimeToLive, CoordinationError> {
        let reply: i64 = self
            .redis_provider
            .query(&RedisCommands::time_to_live(key))
            .await?;
        RedisResultMapper::into_time_to_live(reply)
    }
}
