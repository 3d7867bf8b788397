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

//! Day-bucketed version identifiers.

use super::AtomicCounterAllocator;
use super::DateBucket;
use chrono::DateTime;
use chrono::Local;
use chrono::TimeZone;
use keyclaim_dbp::coord::CoordinationError;
use keyclaim_dbp::coord::CoordinationErrorKind;
use keyclaim_dbp::dbp::StoreProvider;
use std::fmt::Display;
use std::sync::Arc;

/// Version identifier like `20240101-007`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionId {
    date_bucket: String,
    sequence: u16,
}

impl VersionId {
    /// Highest sequence number of a single date bucket.
    pub const MAX_SEQUENCE: u16 = 999;

    /// Calendar day (`YYYYMMDD`) the identifier was minted for.
    pub fn date_bucket(&self) -> &str {
        &self.date_bucket
    }

    /// Sequence number within the date bucket, starting from 1.
    pub fn sequence(&self) -> u16 {
        self.sequence
    }
}

impl Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:03}", self.date_bucket, self.sequence)
    }
}

/**
Mints version identifiers that are unique per type and calendar day.

Each `type_tag` has one counter per day that expires when the day ends.
*/
pub struct VersionGenerator {
    allocator: AtomicCounterAllocator,
    namespace: String,
}

impl VersionGenerator {
    /// Return a new instance that prefixes every counter key with
    /// `namespace`.
    pub fn new(store: &Arc<StoreProvider>, namespace: &str) -> Self {
        Self {
            allocator: AtomicCounterAllocator::new(store),
            namespace: namespace.to_owned(),
        }
    }

    /// Return the counter key of `type_tag` in `date_bucket`.
    pub fn counter_key(&self, type_tag: &str, date_bucket: &str) -> String {
        format!("{}{type_tag}{date_bucket}", self.namespace)
    }

    /// Return a new version identifier for `type_tag` dated with the local
    /// calendar day.
    pub async fn generate_version_now(&self, type_tag: &str) -> Result<VersionId, CoordinationError> {
        self.generate_version(type_tag, &Local::now()).await
    }

    /// Return a new version identifier for `type_tag` dated with the calendar
    /// day of `now` in its own time zone.
    ///
    /// Fails with [CoordinationErrorKind::SequenceOverflow] once more than
    /// [VersionId::MAX_SEQUENCE] identifiers have been minted for the day.
    pub async fn generate_version<Tz: TimeZone>(
        &self,
        type_tag: &str,
        now: &DateTime<Tz>,
    ) -> Result<VersionId, CoordinationError>
    where
        Tz::Offset: Display,
    {
        if type_tag.is_empty() {
            Err(CoordinationErrorKind::InvalidArgument.error_with_msg("Empty type tag."))?;
        }
        let date_bucket = DateBucket::name_of(now);
        let counter_key = self.counter_key(type_tag, &date_bucket);
        let time_to_live = DateBucket::remaining_of(now);
        let sequence = self.allocator.allocate(&counter_key, time_to_live).await?;
        match u16::try_from(sequence) {
            Ok(sequence) if sequence <= VersionId::MAX_SEQUENCE => Ok(VersionId {
                date_bucket,
                sequence,
            }),
            _ => {
                log::info!("Version sequence of '{type_tag}' is exhausted for {date_bucket}.");
                Err(CoordinationErrorKind::SequenceOverflow.error_with_msg(format!(
                    "Sequence {sequence} of '{type_tag}' exceeds {} for {date_bucket}.",
                    VersionId::MAX_SEQUENCE
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use keyclaim_dbp_mem::InMemoryStoreProvider;
    use std::time::Duration;

    fn init_logger() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    }

    fn new_generator() -> (Arc<StoreProvider>, VersionGenerator) {
        let store =
            Arc::new(InMemoryStoreProvider::new().as_store_provider(Duration::from_secs(2)));
        let version_generator = VersionGenerator::new(&store, "test_");
        (store, version_generator)
    }

    #[test]
    fn test_display_is_zero_padded() {
        let version_id = VersionId {
            date_bucket: "20240101".to_string(),
            sequence: 7,
        };
        assert_eq!(version_id.to_string(), "20240101-007");
        let version_id = VersionId {
            date_bucket: "20240101".to_string(),
            sequence: 999,
        };
        assert_eq!(version_id.to_string(), "20240101-999");
    }

    #[tokio::test]
    async fn test_same_second_yields_consecutive_versions() {
        init_logger();
        let (store, version_generator) = new_generator();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let first = version_generator.generate_version("demo", &now).await.unwrap();
        let second = version_generator.generate_version("demo", &now).await.unwrap();
        assert_eq!(first.to_string(), "20240101-001");
        assert_eq!(second.to_string(), "20240101-002");
        assert!(first < second);
        let remaining = store
            .time_to_live("test_demo20240101")
            .await
            .unwrap()
            .remaining()
            .unwrap();
        assert!(remaining <= Duration::from_secs(14 * 3600));
        assert!(remaining > Duration::from_secs(13 * 3600));
    }

    #[tokio::test]
    async fn test_types_and_days_have_separate_sequences() {
        init_logger();
        let (_store, version_generator) = new_generator();
        let day1 = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        for _ in 0..3 {
            version_generator.generate_version("a", &day1).await.unwrap();
        }
        let b = version_generator.generate_version("b", &day1).await.unwrap();
        assert_eq!(b.to_string(), "20240101-001");
        let a2 = version_generator.generate_version("a", &day2).await.unwrap();
        assert_eq!(a2.to_string(), "20240102-001");
        assert_eq!(a2.date_bucket(), "20240102");
        assert_eq!(a2.sequence(), 1);
    }

    #[tokio::test]
    async fn test_thousandth_version_overflows() {
        init_logger();
        let (_store, version_generator) = new_generator();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        for expected in 1..=999u16 {
            let version_id = version_generator.generate_version("demo", &now).await.unwrap();
            assert_eq!(version_id.sequence(), expected);
        }
        let e = version_generator
            .generate_version("demo", &now)
            .await
            .unwrap_err();
        assert_eq!(e.kind(), &CoordinationErrorKind::SequenceOverflow);
        assert!(!e.is_retryable());
    }

    #[tokio::test]
    async fn test_empty_type_tag_is_rejected() {
        init_logger();
        let (store, version_generator) = new_generator();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let e = version_generator.generate_version("", &now).await.unwrap_err();
        assert_eq!(e.kind(), &CoordinationErrorKind::InvalidArgument);
        assert!(!store.exists("test_20240101").await.unwrap());
    }

    #[tokio::test]
    async fn test_generate_version_now_uses_local_day() {
        init_logger();
        let (_store, version_generator) = new_generator();
        let version_id = version_generator.generate_version_now("demo").await.unwrap();
        let today = Local::now().format(DateBucket::FORMAT).to_string();
        let yesterday = (Local::now() - chrono::TimeDelta::days(1))
            .format(DateBucket::FORMAT)
            .to_string();
        // The test may straddle midnight.
        assert!(version_id.date_bucket() == today || version_id.date_bucket() == yesterday);
        assert_eq!(version_id.sequence(), 1);
    }
}
