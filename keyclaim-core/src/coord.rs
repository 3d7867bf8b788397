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

//! Coordination primitives on top of a shared key-value store.

mod atomic_counter_allocator;
mod date_bucket;
mod lock_manager;
mod version_generator;

pub use self::atomic_counter_allocator::AtomicCounterAllocator;
pub use self::date_bucket::DateBucket;
pub use self::lock_manager::FencingToken;
pub use self::lock_manager::LockHandle;
pub use self::lock_manager::LockManager;
pub use self::version_generator::VersionGenerator;
pub use self::version_generator::VersionId;
pub use keyclaim_dbp::coord::CoordinationError;
pub use keyclaim_dbp::coord::CoordinationErrorKind;

use crate::conf::AppConfig;
use keyclaim_dbp::dbp::StoreProvider;
use keyclaim_dbp_mem::InMemoryStoreProvider;
use keyclaim_dbp_redis::RedisProvider;
use std::sync::Arc;
use std::time::Duration;

/** Keyclaim root.

Owns the store connection and hands out the coordination primitives that
share it.
*/
pub struct KeyClaim {
    /// The store provider
    store: Arc<StoreProvider>,
    counter_allocator: Arc<AtomicCounterAllocator>,
    version_generator: Arc<VersionGenerator>,
    lock_manager: Arc<LockManager>,
}

impl KeyClaim {
    /// Return a new instance connected to the configured backend.
    pub async fn new(app_config: &AppConfig) -> Result<Arc<Self>, CoordinationError> {
        let operation_timeout = app_config.backend.operation_timeout();
        let store = match app_config.backend.implementation() {
            "redis" => {
                let redis_provider =
                    RedisProvider::new(app_config.backend.endpoint(), operation_timeout).await?;
                Arc::new(redis_provider.as_store_provider(operation_timeout))
            }
            "mem" => {
                log::info!("Using ephemeral in-memory store. State is lost on exit.");
                Arc::new(InMemoryStoreProvider::new().as_store_provider(operation_timeout))
            }
            unknown_provider => Err(CoordinationErrorKind::InvalidConfiguration
                .error_with_msg(format!("Unknown store provider type '{unknown_provider}'.")))?,
        };
        Ok(Self::with_store_provider(
            &store,
            app_config.backend.namespace(),
            app_config.lock.lease(),
        ))
    }

    /// Return a new instance on top of an existing store provider.
    pub fn with_store_provider(
        store: &Arc<StoreProvider>,
        namespace: &str,
        default_lease: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            store: Arc::clone(store),
            counter_allocator: Arc::new(AtomicCounterAllocator::new(store)),
            version_generator: Arc::new(VersionGenerator::new(store, namespace)),
            lock_manager: Arc::new(LockManager::new(store, namespace, default_lease)),
        })
    }

    /// The shared store provider.
    pub fn store(&self) -> &Arc<StoreProvider> {
        &self.store
    }

    /// Allocator of raw counter values.
    pub fn counter_allocator(&self) -> &Arc<AtomicCounterAllocator> {
        &self.counter_allocator
    }

    /// Generator of day-bucketed version identifiers.
    pub fn version_generator(&self) -> &Arc<VersionGenerator> {
        &self.version_generator
    }

    /// Manager of advisory locks.
    pub fn lock_manager(&self) -> &Arc<LockManager> {
        &self.lock_manager
    }
}
