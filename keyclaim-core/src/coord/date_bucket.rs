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

//! Calendar day partitioning.

use chrono::DateTime;
use chrono::TimeZone;
use std::fmt::Display;
use std::time::Duration;

/// Calendar day partitioning of counters.
///
/// The bucket of an instant is its calendar date in the time zone of the
/// instant.
pub struct DateBucket {}

impl DateBucket {
    /// `chrono` format of a bucket name, i.e. `YYYYMMDD`.
    pub const FORMAT: &'static str = "%Y%m%d";

    /// Fallback when the start of the next day can't be resolved.
    const SECONDS_PER_DAY: i64 = 86_400;

    /// Return the bucket name of `now`.
    pub fn name_of<Tz: TimeZone>(now: &DateTime<Tz>) -> String
    where
        Tz::Offset: Display,
    {
        now.format(Self::FORMAT).to_string()
    }

    /// Return the time remaining until the next bucket starts in whole
    /// seconds, rounded down and never less than one second.
    pub fn remaining_of<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
        let next_midnight_naive = now
            .date_naive()
            .succ_opt()
            .and_then(|next_day| next_day.and_hms_opt(0, 0, 0));
        let seconds = next_midnight_naive
            .map(|next_midnight_naive| {
                now.timezone()
                    .from_local_datetime(&next_midnight_naive)
                    .earliest()
                    .map(|next_midnight| next_midnight.signed_duration_since(now.clone()))
                    // Midnight doesn't exist locally (DST gap), use wall clock distance.
                    .unwrap_or_else(|| next_midnight_naive - now.naive_local())
                    .num_seconds()
            })
            .unwrap_or(Self::SECONDS_PER_DAY);
        Duration::from_secs(u64::try_from(seconds).unwrap_or_default().max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use chrono::Utc;

    #[test]
    fn test_bucket_name() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap();
        assert_eq!(DateBucket::name_of(&now), "20240101");
    }

    #[test]
    fn test_bucket_name_follows_time_zone_of_instant() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap();
        let cet = utc.with_timezone(&FixedOffset::east_opt(3600).unwrap());
        assert_eq!(DateBucket::name_of(&utc), "20240101");
        assert_eq!(DateBucket::name_of(&cet), "20240102");
    }

    #[test]
    fn test_remaining_at_midnight_is_full_day() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(DateBucket::remaining_of(&now), Duration::from_secs(86_400));
    }

    #[test]
    fn test_remaining_is_rounded_down_with_minimum_one() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 23, 0, 0).unwrap();
        assert_eq!(DateBucket::remaining_of(&now), Duration::from_secs(3600));
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 58).unwrap()
            + chrono::TimeDelta::milliseconds(500);
        assert_eq!(DateBucket::remaining_of(&now), Duration::from_secs(1));
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap()
            + chrono::TimeDelta::milliseconds(500);
        assert_eq!(DateBucket::remaining_of(&now), Duration::from_secs(1));
    }

    #[test]
    fn test_remaining_across_year_end() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 12, 0, 0).unwrap();
        assert_eq!(DateBucket::remaining_of(&now), Duration::from_secs(43_200));
    }
}
