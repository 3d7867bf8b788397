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

//! Remaining time to live of a stored key.

use std::time::Duration;

/// Remaining time to live of a stored key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeToLive {
    /// The key does not exist (or has already expired).
    Absent,
    /// The key exists and will never expire.
    Persistent,
    /// The key exists and expires after the contained duration.
    Expires(Duration),
}

impl TimeToLive {
    /// Return the remaining duration when the key will expire.
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Self::Expires(remaining) => Some(*remaining),
            _ => None,
        }
    }

    /// Return `true` if the key exists.
    pub fn exists(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}
