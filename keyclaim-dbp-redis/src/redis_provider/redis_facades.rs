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

//! Redis specific store code.

mod redis_counter_facade;
mod redis_key_value_facade;
mod redis_lease_facade;

pub use self::redis_counter_facade::*;
pub use self::redis_key_value_facade::*;
pub use self::redis_lease_facade::*;
use super::RedisProvider;
use keyclaim_dbp::dbp::facades::*;
use std::sync::Arc;

/// Redis specific store code.
pub struct RedisProviderFacades {
    counter_facade: RedisCounterFacade,
    key_value_facade: RedisKeyValueFacade,
    lease_facade: RedisLeaseFacade,
}

impl RedisProviderFacades {
    /// Return a new instance.
    pub fn new(redis_provider: &Arc<RedisProvider>) -> Self {
        Self {
            counter_facade: RedisCounterFacade::new(redis_provider),
            key_value_facade: RedisKeyValueFacade::new(redis_provider),
            lease_facade: RedisLeaseFacade::new(redis_provider),
        }
    }
}

impl StoreProviderFacades for RedisProviderFacades {
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
