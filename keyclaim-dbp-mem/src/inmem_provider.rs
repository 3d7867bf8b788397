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

//! Ephemeral in-memory implementation of [StoreProvider].

mod inmem_facades;
mod inmem_slot;

use self::inmem_facades::InMemProviderFacades;
use self::inmem_slot::InMemEntry;
use self::inmem_slot::InMemSlot;
use crossbeam_skiplist::SkipMap;
use keyclaim_dbp::dbp::StoreProvider;
use std::sync::Arc;
use std::time::Duration;

/** Ephemeral in-memory implementation of [StoreProvider].

Each key with a value maps to a slot. All callers of the same key serialize on
that slot. A slot is removed from the map as soon as it is found empty, so an
expired key occupies memory until it is next accessed.
*/
pub struct InMemoryStoreProvider {
    slots: SkipMap<String, Arc<InMemSlot>>,
}

impl InMemoryStoreProvider {
    /// Return a new instance.
    pub fn new() -> Arc<Self> {
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("Using in-mem store provider.");
        }
        Arc::new(Self {
            slots: SkipMap::default(),
        })
    }

    /// Get [StoreProvider] instance where each call is bounded by
    /// `operation_timeout`.
    pub fn as_store_provider(self: &Arc<Self>, operation_timeout: Duration) -> StoreProvider {
        StoreProvider::new(
            Arc::new(InMemProviderFacades::new(self)),
            operation_timeout,
        )
    }

    /// Run `f` with exclusive access to the live entry of `key`, creating
    /// the slot when needed.
    fn with_live_entry<R>(
        &self,
        key: &str,
        mut f: impl FnOnce(&mut Option<InMemEntry>) -> R,
    ) -> R {
        loop {
            let slot = Arc::clone(
                self.slots
                    .get_or_insert_with(key.to_owned(), Arc::default)
                    .value(),
            );
            match slot.with_live_entry(f, || self.retire(key)) {
                Ok(ret) => return ret,
                // Lost a race with the removal of an emptied slot.
                Err(unused) => f = unused,
            }
        }
    }

    /// Run `f` with exclusive access to the live entry of `key` if there is
    /// one. Returns `None` when the key is absent.
    fn with_existing_live_entry<R>(
        &self,
        key: &str,
        f: impl FnOnce(&mut Option<InMemEntry>) -> R,
    ) -> Option<R> {
        let slot = Arc::clone(self.slots.get(key)?.value());
        // A retired slot was empty when it was retired.
        slot.with_live_entry(f, || self.retire(key)).ok()
    }

    /// Remove the slot of `key`. Only called while the slot is locked.
    fn retire(&self, key: &str) {
        self.slots.remove(key);
    }
}
