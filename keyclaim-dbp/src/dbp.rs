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

//! Store Provider abstraction

pub mod facades;

use self::facades::*;
use crate::coord::CoordinationError;
use crate::coord::CoordinationErrorKind;
use crate::coord::TimeToLive;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/** The Store Provider.

Implementation logic is abstracted by [StoreProviderFacades] for related
operations. Every call is bounded by the operation timeout and a call that
doesn't complete in time fails with [CoordinationErrorKind::StoreUnavailable].
No call is ever retried here.
*/
pub struct StoreProvider {
    facades: Arc<dyn StoreProviderFacades>,
    operation_timeout: Duration,
}

impl StoreProvider {
    /// Return a new instance.
    pub fn new(facades: Arc<dyn StoreProviderFacades>, operation_timeout: Duration) -> Self {
        Self {
            facades,
            operation_timeout,
        }
    }

    /// Maximum time a single store call is allowed to take.
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// See [KeyValueFacade::get].
    pub async fn get(&self, key: &str) -> Result<Option<String>, CoordinationError> {
        self.bounded("get", key, self.facades.key_value_facade().get(key))
            .await
    }

    /// See [KeyValueFacade::set].
    pub async fn set(
        &self,
        key: &str,
        value: &str,
        time_to_live: Option<Duration>,
    ) -> Result<(), CoordinationError> {
        self.bounded(
            "set",
            key,
            self.facades.key_value_facade().set(key, value, time_to_live),
        )
        .await
    }

    /// See [KeyValueFacade::exists].
    pub async fn exists(&self, key: &str) -> Result<bool, CoordinationError> {
        self.bounded("exists", key, self.facades.key_value_facade().exists(key))
            .await
    }

    /// See [KeyValueFacade::delete].
    pub async fn delete(&self, key: &str) -> Result<bool, CoordinationError> {
        self.bounded("delete", key, self.facades.key_value_facade().delete(key))
            .await
    }

    /// See [KeyValueFacade::expire].
    pub async fn expire(&self, key: &str, time_to_live: Duration) -> Result<bool, CoordinationError> {
        self.bounded(
            "expire",
            key,
            self.facades.key_value_facade().expire(key, time_to_live),
        )
        .await
    }

    /// See [KeyValueFacade::time_to_live].
    pub async fn time_to_live(&self, key: &str) -> Result<TimeToLive, CoordinationError> {
        self.bounded(
            "time_to_live",
            key,
            self.facades.key_value_facade().time_to_live(key),
        )
        .await
    }

    /// See [CounterFacade::increment].
    pub async fn increment(&self, key: &str) -> Result<i64, CoordinationError> {
        self.bounded("increment", key, self.facades.counter_facade().increment(key))
            .await
    }

    /// See [LeaseFacade::set_if_absent].
    pub async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        time_to_live: Duration,
    ) -> Result<bool, CoordinationError> {
        self.bounded(
            "set_if_absent",
            key,
            self.facades
                .lease_facade()
                .set_if_absent(key, value, time_to_live),
        )
        .await
    }

    /// See [LeaseFacade::compare_and_delete].
    pub async fn compare_and_delete(
        &self,
        key: &str,
        expected: &str,
    ) -> Result<bool, CoordinationError> {
        self.bounded(
            "compare_and_delete",
            key,
            self.facades.lease_facade().compare_and_delete(key, expected),
        )
        .await
    }

    /// See [LeaseFacade::compare_and_expire].
    pub async fn compare_and_expire(
        &self,
        key: &str,
        expected: &str,
        time_to_live: Duration,
    ) -> Result<bool, CoordinationError> {
        self.bounded(
            "compare_and_expire",
            key,
            self.facades
                .lease_facade()
                .compare_and_expire(key, expected, time_to_live),
        )
        .await
    }

    /// Run the store call and give up once the operation timeout has passed.
    async fn bounded<T>(
        &self,
        operation: &str,
        key: &str,
        store_call: impl Future<Output = Result<T, CoordinationError>>,
    ) -> Result<T, CoordinationError> {
        tokio::time::timeout(self.operation_timeout, store_call)
            .await
            .map_err(|_elapsed| {
                if log::log_enabled!(log::Level::Debug) {
                    log::debug!(
                        "Store call '{operation}' for key '{key}' did not complete within {} ms.",
                        self.operation_timeout.as_millis()
                    );
                }
                CoordinationErrorKind::StoreUnavailable.error_with_msg(format!(
                    "'{operation}' on '{key}' timed out after {} ms.",
                    self.operation_timeout.as_millis()
                ))
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store that never answers.
    struct UnresponsiveFacades;

    #[async_trait::async_trait]
    impl CounterFacade for UnresponsiveFacades {
        async fn increment(&self, _key: &str) -> Result<i64, CoordinationError> {
            std::future::pending().await
        }
    }

    #[async_trait::async_trait]
    impl KeyValueFacade for UnresponsiveFacades {
        async fn get(&self, _key: &str) -> Result<Option<String>, CoordinationError> {
            std::future::pending().await
        }

        async fn set(
            &self,
            _key: &str,
            _value: &str,
            _time_to_live: Option<Duration>,
        ) -> Result<(), CoordinationError> {
            std::future::pending().await
        }

        async fn exists(&self, _key: &str) -> Result<bool, CoordinationError> {
            Err(CoordinationErrorKind::StoreProtocolError.error_with_msg("garbled"))
        }

        async fn delete(&self, _key: &str) -> Result<bool, CoordinationError> {
            std::future::pending().await
        }

        async fn expire(
            &self,
            _key: &str,
            _time_to_live: Duration,
        ) -> Result<bool, CoordinationError> {
            std::future::pending().await
        }

        async fn time_to_live(&self, _key: &str) -> Result<TimeToLive, CoordinationError> {
            Ok(TimeToLive::Persistent)
        }
    }

    #[async_trait::async_trait]
    impl LeaseFacade for UnresponsiveFacades {
        async fn set_if_absent(
            &self,
            _key: &str,
            _value: &str,
            _time_to_live: Duration,
        ) -> Result<bool, CoordinationError> {
            std::future::pending().await
        }

        async fn compare_and_delete(
            &self,
            _key: &str,
            _expected: &str,
        ) -> Result<bool, CoordinationError> {
            std::future::pending().await
        }

        async fn compare_and_expire(
            &self,
            _key: &str,
            _expected: &str,
            _time_to_live: Duration,
        ) -> Result<bool, CoordinationError> {
            std::future::pending().await
        }
    }

    impl StoreProviderFacades for UnresponsiveFacades {
        fn counter_facade(&self) -> &dyn CounterFacade {
            self
        }

        fn key_value_facade(&self) -> &dyn KeyValueFacade {
            self
        }

        fn lease_facade(&self) -> &dyn LeaseFacade {
            self
        }
    }

    fn init_logger() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    }

    fn unresponsive_store() -> StoreProvider {
        StoreProvider::new(Arc::new(UnresponsiveFacades), Duration::from_millis(250))
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_calls_surface_as_unavailable() {
        init_logger();
        let store = unresponsive_store();
        let e = store.increment("counter").await.unwrap_err();
        assert_eq!(e.kind(), &CoordinationErrorKind::StoreUnavailable);
        assert!(e.is_retryable());
        let e = store
            .set_if_absent("lock", "token", Duration::from_secs(10))
            .await
            .unwrap_err();
        assert_eq!(e.kind(), &CoordinationErrorKind::StoreUnavailable);
        let e = store.compare_and_delete("lock", "token").await.unwrap_err();
        assert_eq!(e.kind(), &CoordinationErrorKind::StoreUnavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_calls_pass_through_unchanged() {
        init_logger();
        let store = unresponsive_store();
        let e = store.exists("key").await.unwrap_err();
        assert_eq!(e.kind(), &CoordinationErrorKind::StoreProtocolError);
        assert_eq!(
            store.time_to_live("key").await.unwrap(),
            TimeToLive::Persistent
        );
    }
}
