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

//! Ephemeral in-memory implementation of [CounterFacade].

use crate::InMemoryStoreProvider;
use crate::inmem_provider::inmem_slot::InMemEntry;
use keyclaim_dbp::coord::CoordinationError;
use keyclaim_dbp::coord::CoordinationErrorKind;
use keyclaim_dbp::dbp::facades::CounterFacade;
use std::sync::Arc;

/// Ephemeral in-memory implementation of [CounterFacade].
pub struct InMemCounterFacade {
    inmem_provider: Arc<InMemoryStoreProvider>,
}

impl InMemCounterFacade {
    /// Return a new instance.
    pub fn new(inmem_provider: &Arc<InMemoryStoreProvider>) -> Self {
        Self {
            inmem_provider: Arc::clone(inmem_provider),
        }
    }
}

#[async_trait::async_trait]
impl CounterFacade for InMemCounterFacade {
    async fn increment(&self, key: &str) -> Result<i64, CoordinationError> {
        self.inmem_provider
            .with_live_entry(key, |entry| match entry {
                Some(entry) => {
                    let next = entry
                        .value
                        .parse::<i64>()
                        .map_err(|_| {
                            CoordinationErrorKind::StoreProtocolError.error_with_msg(format!(
                                "Value of '{key}' is not an integer."
                            ))
                        })?
                        .checked_add(1)
                        .ok_or_else(|| {
                            CoordinationErrorKind::StoreProtocolError
                                .error_with_msg(format!("Increment of '{key}' would overflow."))
                        })?;
                    entry.value = next.to_string();
                    Ok(next)
                }
                None => {
                    *entry = Some(InMemEntry::new(1.to_string(), None));
                    Ok(1)
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use crate::InMemoryStoreProvider;
    use keyclaim_dbp::coord::CoordinationErrorKind;
    use keyclaim_dbp::coord::TimeToLive;
    use std::time::Duration;

    fn init_logger() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    }

    #[tokio::test(start_paused = true)]
    async fn test_increment_creates_and_keeps_ttl() {
        init_logger();
        let store = InMemoryStoreProvider::new().as_store_provider(Duration::from_secs(1));
        assert_eq!(store.increment("c").await.unwrap(), 1);
        assert!(store.expire("c", Duration::from_secs(60)).await.unwrap());
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(store.increment("c").await.unwrap(), 2);
        assert_eq!(
            store.time_to_live("c").await.unwrap(),
            TimeToLive::Expires(Duration::from_secs(50))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_increment_of_text_is_protocol_error() {
        init_logger();
        let store = InMemoryStoreProvider::new().as_store_provider(Duration::from_secs(1));
        store.set("c", "bar", None).await.unwrap();
        let e = store.increment("c").await.unwrap_err();
        assert_eq!(e.kind(), &CoordinationErrorKind::StoreProtocolError);
        assert_eq!(store.get("c").await.unwrap().as_deref(), Some("bar"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_distinct() {
        init_logger();
        let inmem_provider = InMemoryStoreProvider::new();
        let store = std::sync::Arc::new(inmem_provider.as_store_provider(Duration::from_secs(5)));
        let tasks = (0..200)
            .map(|_| {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move { store.increment("c").await.unwrap() })
            })
            .collect::<Vec<_>>();
        let mut values = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect::<Vec<_>>();
        values.sort_unstable();
        assert_eq!(values, (1..=200).collect::<Vec<i64>>());
    }
}
