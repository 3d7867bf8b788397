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

//! Time related utility functions.

use std::time::Duration;

/// Microseconds since UNIX epoch.
///
/// Returns `0` if the system clock is set before the epoch.
pub fn get_timestamp_micros() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .ok()
        .and_then(|since_epoch| u64::try_from(since_epoch.as_micros()).ok())
        .unwrap_or_default()
}

/// Whole milliseconds of a [Duration] as expected by stores that count TTL in
/// milliseconds. Never less than `1`.
pub fn as_ttl_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis())
        .unwrap_or(u64::MAX)
        .max(1)
}

/// Saturating conversion of a [Duration] to microseconds.
pub fn as_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_millis_never_zero() {
        assert_eq!(as_ttl_millis(Duration::ZERO), 1);
        assert_eq!(as_ttl_millis(Duration::from_micros(999)), 1);
        assert_eq!(as_ttl_millis(Duration::from_secs(10)), 10_000);
    }

    #[test]
    fn test_timestamp_is_after_2020() {
        assert!(get_timestamp_micros() > 1_577_836_800_000_000);
    }
}
