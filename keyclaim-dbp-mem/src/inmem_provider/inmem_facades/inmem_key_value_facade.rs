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

//! Ephemeral in-memory implementation of [KeyValueFacade].

use crate::InMemoryStoreProvider;
use crate::inmem_provider::inmem_slot::InMemEntry;
use keyclaim_dbp::coord::CoordinationError;
use keyclaim_dbp::coord::TimeToLive;
use keyclaim_dbp::dbp::facades::KeyValueFacade;
use std::sync::Arc;
use std::time::Duration;

/// Ephemeral in-memory implementation of [KeyValueFacade].
pub struct InMemKeyValueFacade {
    inmem_provider: Arc<InMemoryStoreProvider>,
}

impl InMemKeyValueFacade {
    /// Return a new instance.
    pub fn new(inmem_provider: &Arc<InMemoryStoreProvider>) -> Self {
        Self {
            inmem_provider: Arc::clone(inmem_provider),
        }
    }
}

#[async_trait::async_trait]
impl KeyValueFacade for InMemKeyValueFacade {
    async fn get(&self, key: &str) -> Result<Option<String>, CoordinationError> {
        Ok(self
            .inmem_provider
            .with_existing_live_entry(key, |entry| {
                entry.as_ref().map(|entry| entry.value.to_owned())
            })
            .flatten())
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        time_to_live: Option<Duration>,
    ) -> Result<(), CoordinationError> {
        self.inmem_provider.with_live_entry(key, |entry| {
            *entry = Some(InMemEntry::new(value.to_owned(), time_to_live));
        });
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CoordinationError> {
        Ok(self
            .inmem_provider
            .with_existing_live_entry(key, |entry| entry.is_some())
            .unwrap_or(false))
    }

    async fn delete(&self, key: &str) -> Result<bool, CoordinationError> {
        Ok(self
            .inmem_provider
            .with_existing_live_entry(key, |entry| entry.take().is_some())
            .unwrap_or(false))
    }

    async fn expire(&self, key: &str, time_to_live: Duration) -> Result<bool, CoordinationError> {
        Ok(self
            .inmem_provider
            .with_existing_live_entry(key, |entry| {
                entry
                    .as_mut()
                    .map(|entry| entry.expires_at = InMemEntry::expiry_after(time_to_live))
                    .is_some()
            })
            .unwrap_or(false))
    }

    async fn time_to_live(&self, key: &str) -> Result<TimeToLive, CoordinationError> {
        Ok(self
            .inmem_provider
            .with_existing_live_entry(key, |entry| {
                entry.as_ref().map(|entry| {
                    entry
                        .remaining()
                        .map(TimeToLive::Expires)
                        .unwrap_or(TimeToLive::Persistent)
                })
            })
            .flatten()
            .unwrap_or(TimeToLive::Absent))
    }
}
