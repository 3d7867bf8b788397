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

//! Ephemeral in-memory specific store code.

mod inmem_counter_facade;
mod inmem_key_value_facade;
mod inmem_lease_facade;

pub use self::inmem_counter_facade::*;
pub use self::inmem_key_value_facade::*;
pub use self::inmem_lease_facade::*;
use super::InMemoryStoreProvider;
use keyclaim_dbp::dbp::facades::*;
use std::sync::Arc;

/// Ephemeral in-memory specific store code.
pub struct InMemProviderFacades {
    counter_facade: InMemCounterFacade,
    key_value_facade: InMemKeyValueFacade,
    lease_facade: InMemLeaseFacade,
}

impl InMemProviderFacades {
    /// Return a new instance.
    pub fn new(inmem_provider: &Arc<InMemoryStoreProvider>) -> Self {
        Self {
            counter_facade: InMemCounterFacade::new(inmem_provider),
            key_value_facade: InMemKeyValueFacade::new(inmem_provider),
            lease_facade: InMemLeaseFacade::new(inmem_provider),
        }
    }
}

impl StoreProviderFacades for InMemProviderFacades {
    fn counter_facade(&self) -> &dyn CounterFacade {
        &self.counter_facade
    }

    fn key_value_facade(&self) -> &dyn KeyValueFacade {
        &self.key_value_facade
    }

    fn lease_facade(&self) -> &dyn LeaseFacade {
        &self.lease_facade
    }
}
