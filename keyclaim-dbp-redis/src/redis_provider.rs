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

//! Redis implementation of [StoreProvider].

mod redis_commands;
mod redis_facades;
mod redis_result_mapper;
mod redis_scripts;

use self::redis_facades::RedisProviderFacades;
pub use self::redis_result_mapper::RedisResultMapper;
use self::redis_scripts::RedisScripts;
use keyclaim_dbp::coord::CoordinationError;
use keyclaim_dbp::coord::CoordinationErrorKind;
use keyclaim_dbp::dbp::StoreProvider;
use redis::Cmd;
use redis::FromRedisValue;
use redis::ScriptInvocation;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;

/// Redis [StoreProvider] implementation.
pub struct RedisProvider {
    /// Multiplexed connection that reconnects on failure.
    connection: ConnectionManager,
    /// Server side scripts for value guarded operations.
    scripts: RedisScripts,
}

impl RedisProvider {
    /// Return a new instance connected to the Redis server at `endpoint`.
    ///
    /// The `endpoint` is a Redis URL like `redis://:password@host:6379/0`.
    pub async fn new(endpoint: &str, connect_timeout: Duration) -> Result<Arc<Self>, CoordinationError> {
        let client = redis::Client::open(endpoint).map_err(|e| {
            CoordinationErrorKind::InvalidConfiguration
                .error_with_msg(format!("Unusable Redis endpoint: {e}"))
        })?;
        let server = client.get_connection_info().addr.to_string();
        log::info!("Connecting to Redis server '{server}'.");
        let connection = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_elapsed| {
                CoordinationErrorKind::StoreUnavailable.error_with_msg(format!(
                    "No connection to Redis server '{server}' within {} ms.",
                    connect_timeout.as_millis()
                ))
            })?
            .map_err(|e| {
                log::info!("Failed to connect to Redis server '{server}': {e:?}");
                RedisResultMapper::into_coordination_error(e)
            })?;
        log::info!("Connected to Redis server '{server}'.");
        Ok(Arc::new(Self {
            connection,
            scripts: RedisScripts::default(),
        }))
    }

    /// Get [StoreProvider] instance where each call is bounded by
    /// `operation_timeout`.
    pub fn as_store_provider(self: &Arc<Self>, operation_timeout: Duration) -> StoreProvider {
        StoreProvider::new(
            Arc::new(RedisProviderFacades::new(self)),
            operation_timeout,
        )
    }

    /// Run a single command.
    async fn query<T: FromRedisValue>(&self, cmd: &Cmd) -> Result<T, CoordinationError> {
        let mut connection = self.connection.clone();
        cmd.query_async(&mut connection)
            .await
            .map_err(RedisResultMapper::into_coordination_error)
    }

    /// Run a server side script.
    async fn invoke<T: FromRedisValue>(
        &self,
        invocation: &ScriptInvocation<'_>,
    ) -> Result<T, CoordinationError> {
        let mut connection = self.connection.clone();
        invocation
            .invoke_async(&mut connection)
            .await
            .map_err(RedisResultMapper::into_coordination_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    }

    #[tokio::test]
    async fn test_malformed_endpoint_is_configuration_error() {
        init_logger();
        let e = RedisProvider::new("not-a-redis-url", Duration::from_millis(500))
            .await
            .err()
            .unwrap();
        assert_eq!(e.kind(), &CoordinationErrorKind::InvalidConfiguration);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        init_logger();
        // Port 1 (tcpmux) is not expected to accept connections.
        let e = RedisProvider::new("redis://127.0.0.1:1/", Duration::from_millis(500))
            .await
            .err()
            .unwrap();
        assert_eq!(e.kind(), &CoordinationErrorKind::StoreUnavailable);
        assert!(e.is_retryable());
    }
}
