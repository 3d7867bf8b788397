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

//! Redis implementation of [LeaseFacade].

use crate::RedisProvider;
use crate::RedisResultMapper;
use crate::redis_provider::redis_commands::RedisCommands;
use keyclaim_dbp::coord::CoordinationError;
use keyclaim_dbp::dbp::facades::LeaseFacade;
use keyclaim_dbp::time::as_ttl_millis;
use std::sync::Arc;
use std::time::Duration;

/// Redis implementation of [LeaseFacade].
pub struct RedisLeaseFacade {
    redis_provider: Arc<RedisProvider>,
}

impl RedisLeaseFacade {
    /// Return a new instance.
    pub fn new(redis_provider: &Arc<RedisProvider>) -> Self {
        Self {
            redis_provider: Arc::clone(redis_provider),
        }
    }
}

#[async_trait::async_trait]
impl LeaseFacade for RedisLeaseFacade {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        time_to_live: Duration,
    ) -> Result<bool, CoordinationError> {
        let reply: Option<String> = self
            .redis_provider
            .query(&RedisCommands::set_if_absent(key, value, time_to_live))
            .await?;
        RedisResultMapper::into_stored(reply)
    }

    async fn compare_and_delete(
        &self,
        key: &str,
        expected: &str,
    ) -> Result<bool, CoordinationError> {
        let reply: i64 = self
            .redis_provider
            .invoke(
                self.redis_provider
                    .scripts
                    .compare_and_delete
                    .key(key)
                    .arg(expected),
            )
            .await?;
        RedisResultMapper::into_flag(reply)
    }

    async fn compare_and_expire(
        &self,
        key: &str,
        expected: &str,
        time_to_live: Duration,
    ) -> Result<bool, CoordinationError> {
        let reply: i64 = self
            .redis_provider
            .invoke(
                self.redis_provider
                    .scripts
                    .compare_and_expire
                    .key(key)
                    .arg(expected)
                    .arg(as_ttl_millis(time_to_live)),
            )
            .await?;
        RedisResultMapper::into_flag(reply)
    }
}
