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

//! Store facades.

mod counter_facade;
mod key_value_facade;
mod lease_facade;

pub use self::counter_facade::*;
pub use self::key_value_facade::*;
pub use self::lease_facade::*;

/// Provide access to store facades.
pub trait StoreProviderFacades: Send + Sync {
    /// See [CounterFacade].
    fn counter_facade(&self) -> &dyn CounterFacade;

    /// See [KeyValueFacade].
    fn key_value_facade(&self) -> &dyn KeyValueFacade;

    /// See [LeaseFacade].
    fn lease_facade(&self) -> &dyn LeaseFacade;
}
