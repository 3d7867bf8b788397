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

//! Ephemeral in-memory implementation of [LeaseFacade].

use crate::InMemoryStoreProvider;
use crate::inmem_provider::inmem_slot::InMemEntry;
use keyclaim_dbp::coord::CoordinationError;
use keyclaim_dbp::dbp::facades::LeaseFacade;
use std::sync::Arc;
use std::time::Duration;

/// Ephemeral in-memory implementation of [LeaseFacade].
pub struct InMemLeaseFacade {
    inmem_provider: Arc<InMemoryStoreProvider>,
}

impl InMemLeaseFacade {
    /// Return a new instance.
    pub fn new(inmem_provider: &Arc<InMemoryStoreProvider>) -> Self {
        Self {
            inmem_provider: Arc::clone(inmem_provider),
        }
    }
}

#[async_trait::async_trait]
impl LeaseFacade for InMemLeaseFacade {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        time_to_live: Duration,
    ) -> Result<bool, CoordinationError> {
        Ok(self.inmem_provider.with_live_entry(key, |entry| {
            if entry.is_some() {
                return false;
            }
            *entry = Some(InMemEntry::new(value.to_owned(), Some(time_to_live)));
            true
        }))
    }

    async fn compare_and_delete(
        &self,
        key: &str,
        expected: &str,
    ) -> Result<bool, CoordinationError> {
        Ok(self
            .inmem_provider
            .with_existing_live_entry(key, |entry| {
                if entry.as_ref().is_some_and(|entry| entry.value == expected) {
                    *entry = None;
                    true
                } else {
                    false
                }
            })
            .unwrap_or(false))
    }

    async fn compare_and_expire(
        &self,
        key: &str,
        expected: &str,
        time_to_live: Duration,
    ) -> Result<bool, CoordinationError> {
        Ok(self
            .inmem_provider
            .with_existing_live_entry(key, |entry| match entry {
                Some(entry) if entry.value == expected => {
                    entry.expires_at = InMemEntry::expiry_after(time_to_live);
                    true
                }
                _ => false,
            })
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use crate::InMemoryStoreProvider;
    use keyclaim_dbp::coord::TimeToLive;
    use std::time::Duration;

    fn init_logger() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_if_absent_respects_existing_and_expired() {
        init_logger();
        let store = InMemoryStoreProvider::new().as_store_provider(Duration::from_secs(1));
        assert!(
            store
                .set_if_absent("l", "a", Duration::from_secs(1))
                .await
                .unwrap()
        );
        assert!(
            !store
                .set_if_absent("l", "b", Duration::from_secs(1))
                .await
                .unwrap()
        );
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert!(
            store
                .set_if_absent("l", "b", Duration::from_secs(1))
                .await
                .unwrap()
        );
        assert_eq!(store.get("l").await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_compare_and_delete_only_matching_value() {
        init_logger();
        let store = InMemoryStoreProvider::new().as_store_provider(Duration::from_secs(1));
        assert!(!store.compare_and_delete("l", "a").await.unwrap());
        store
            .set_if_absent("l", "a", Duration::from_secs(10))
            .await
            .unwrap();
        assert!(!store.compare_and_delete("l", "b").await.unwrap());
        assert!(store.exists("l").await.unwrap());
        assert!(store.compare_and_delete("l", "a").await.unwrap());
        assert!(!store.exists("l").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_compare_and_expire_only_matching_value() {
        init_logger();
        let store = InMemoryStoreProvider::new().as_store_provider(Duration::from_secs(1));
        store
            .set_if_absent("l", "a", Duration::from_secs(10))
            .await
            .unwrap();
        assert!(
            !store
                .compare_and_expire("l", "b", Duration::from_secs(60))
                .await
                .unwrap()
        );
        assert_eq!(
            store.time_to_live("l").await.unwrap(),
            TimeToLive::Expires(Duration::from_secs(10))
        );
        assert!(
            store
                .compare_and_expire("l", "a", Duration::from_secs(60))
                .await
                .unwrap()
        );
        assert_eq!(
            store.time_to_live("l").await.unwrap(),
            TimeToLive::Expires(Duration::from_secs(60))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_lease_does_not_panic() {
        init_logger();
        let store = InMemoryStoreProvider::new().as_store_provider(Duration::from_secs(1));
        assert!(
            store
                .set_if_absent("l", "a", Duration::from_secs(u64::MAX))
                .await
                .unwrap()
        );
        assert!(
            store
                .compare_and_expire("l", "a", Duration::MAX)
                .await
                .unwrap()
        );
        assert_eq!(
            store.time_to_live("l").await.unwrap(),
            TimeToLive::Persistent
        );
        assert!(store.compare_and_delete("l", "a").await.unwrap());
    }
}
