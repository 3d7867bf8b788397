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

//! Parsing of configuration for advisory locks.

use config::ConfigBuilder;
use config::ConfigError;
use config::builder::BuilderState;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

use super::AppConfigDefaults;

/// Configuration for advisory locks.
#[derive(Debug, Deserialize, Serialize)]
pub struct LockConfig {
    /// Default lease in seconds.
    leasesecs: u64,
    /// How often a held lock is renewed as percent of the lease.
    renewpercent: u8,
}

impl AppConfigDefaults for LockConfig {
    /// Provide defaults for this part of the configuration
    fn set_defaults<T: BuilderState>(
        config_builder: ConfigBuilder<T>,
        prefix: &str,
    ) -> Result<ConfigBuilder<T>, ConfigError> {
        config_builder
            .set_default(prefix.to_string() + "." + "leasesecs", "30")?
            .set_default(prefix.to_string() + "." + "renewpercent", "33")
    }
}

impl LockConfig {
    /// Default lease of a lock. At least one second.
    pub fn lease(&self) -> Duration {
        Duration::from_secs(self.leasesecs.max(1))
    }

    /// Interval between renewals of a held lock with the default lease.
    pub fn renew_interval(&self) -> Duration {
        self.renew_interval_for(self.lease())
    }

    /// Interval between renewals of a held lock with the given lease.
    ///
    /// The percentage is clamped to 1..=90 so that a renewal is always
    /// attempted well before the lease runs out.
    pub fn renew_interval_for(&self, lease: Duration) -> Duration {
        let percent = u32::from(self.renewpercent.clamp(1, 90));
        lease
            .checked_mul(percent)
            .map(|scaled| scaled / 100)
            .unwrap_or_else(|| lease / 100 * percent)
    }
}
