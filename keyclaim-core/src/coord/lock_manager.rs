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

//! Lease based advisory locks.

use keyclaim_dbp::coord::CoordinationError;
use keyclaim_dbp::coord::CoordinationErrorKind;
use keyclaim_dbp::dbp::StoreProvider;
use keyclaim_dbp::time::as_micros;
use keyclaim_dbp::time::get_timestamp_micros;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

/// Random value that identifies one holder of a lock.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FencingToken(String);

impl FencingToken {
    fn random() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Return the token as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FencingToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/**
Proof of a successful lock acquisition.

The lease expiry is measured from before the acquisition request was sent, so
it never overestimates how long the lock is held.
*/
#[derive(Debug)]
pub struct LockHandle {
    lock_key: String,
    fencing_token: FencingToken,
    lease_expiry_micros: u64,
    lease: Duration,
}

impl LockHandle {
    /// Logical lock key as requested by the caller.
    pub fn lock_key(&self) -> &str {
        &self.lock_key
    }

    /// The token written to the store for this acquisition.
    pub fn fencing_token(&self) -> &FencingToken {
        &self.fencing_token
    }

    /// Duration of the last granted lease.
    pub fn lease(&self) -> Duration {
        self.lease
    }

    /// Local time in epoch microseconds when the lease runs out.
    pub fn lease_expiry_micros(&self) -> u64 {
        self.lease_expiry_micros
    }

    /// Return the lease left according to the local clock.
    pub fn remaining(&self) -> Duration {
        Duration::from_micros(
            self.lease_expiry_micros
                .saturating_sub(get_timestamp_micros()),
        )
    }
}

/**
Grants mutual exclusion over named resources across processes.

A lock is a key in the store holding the holder's [FencingToken]. The key
expires with the lease, so a crashed holder loses the lock without any
cleanup. Release and renewal only act when the stored token still matches.
*/
pub struct LockManager {
    store: Arc<StoreProvider>,
    namespace: String,
    default_lease: Duration,
}

impl LockManager {
    /// Return a new instance.
    pub fn new(store: &Arc<StoreProvider>, namespace: &str, default_lease: Duration) -> Self {
        Self {
            store: Arc::clone(store),
            namespace: namespace.to_owned(),
            default_lease,
        }
    }

    /// Lease used by [Self::try_acquire_default].
    pub fn default_lease(&self) -> Duration {
        self.default_lease
    }

    /// Key in the store that represents `lock_key`.
    pub fn store_key(&self, lock_key: &str) -> String {
        format!("{}lock_{lock_key}", self.namespace)
    }

    /// Try to acquire `lock_key` with the default lease.
    pub async fn try_acquire_default(
        &self,
        lock_key: &str,
    ) -> Result<Option<LockHandle>, CoordinationError> {
        self.try_acquire(lock_key, self.default_lease).await
    }

    /// Try to acquire `lock_key` for `lease`.
    ///
    /// Returns `None` when the lock is currently held. Never waits.
    pub async fn try_acquire(
        &self,
        lock_key: &str,
        lease: Duration,
    ) -> Result<Option<LockHandle>, CoordinationError> {
        Self::assert_valid(lock_key, lease)?;
        let fencing_token = FencingToken::random();
        let requested_micros = get_timestamp_micros();
        let acquired = self
            .store
            .set_if_absent(&self.store_key(lock_key), fencing_token.as_str(), lease)
            .await?;
        if !acquired {
            if log::log_enabled!(log::Level::Trace) {
                log::trace!("Lock '{lock_key}' is held by someone else.");
            }
            return Ok(None);
        }
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Acquired lock '{lock_key}' with token {fencing_token} for {} ms.",
                lease.as_millis()
            );
        }
        Ok(Some(LockHandle {
            lock_key: lock_key.to_owned(),
            fencing_token,
            lease_expiry_micros: requested_micros.saturating_add(as_micros(lease)),
            lease,
        }))
    }

    /// Release the lock held through `lock_handle`.
    ///
    /// Fails with [CoordinationErrorKind::LockAlreadyLost] when the lease has
    /// expired, regardless of whether someone else holds the lock now. The
    /// lock of another holder is never removed.
    pub async fn release(&self, lock_handle: LockHandle) -> Result<(), CoordinationError> {
        let released = self
            .store
            .compare_and_delete(
                &self.store_key(&lock_handle.lock_key),
                lock_handle.fencing_token.as_str(),
            )
            .await?;
        if released {
            if log::log_enabled!(log::Level::Debug) {
                log::debug!(
                    "Released lock '{}' with token {}.",
                    lock_handle.lock_key,
                    lock_handle.fencing_token
                );
            }
            Ok(())
        } else {
            Err(Self::lost(&lock_handle))
        }
    }

    /// Extend the lease of `lock_handle` to `extend_by` from now.
    ///
    /// Fails with [CoordinationErrorKind::LockAlreadyLost] when the lease has
    /// already expired.
    pub async fn renew(
        &self,
        lock_handle: &mut LockHandle,
        extend_by: Duration,
    ) -> Result<(), CoordinationError> {
        Self::assert_valid(&lock_handle.lock_key, extend_by)?;
        let requested_micros = get_timestamp_micros();
        let renewed = self
            .store
            .compare_and_expire(
                &self.store_key(&lock_handle.lock_key),
                lock_handle.fencing_token.as_str(),
                extend_by,
            )
            .await?;
        if !renewed {
            return Err(Self::lost(lock_handle));
        }
        lock_handle.lease_expiry_micros = requested_micros.saturating_add(as_micros(extend_by));
        lock_handle.lease = extend_by;
        if log::log_enabled!(log::Level::Trace) {
            log::trace!(
                "Renewed lock '{}' for {} ms.",
                lock_handle.lock_key,
                extend_by.as_millis()
            );
        }
        Ok(())
    }

    /// Return the token of the current holder of `lock_key`, if any.
    pub async fn holder(&self, lock_key: &str) -> Result<Option<FencingToken>, CoordinationError> {
        Ok(self
            .store
            .get(&self.store_key(lock_key))
            .await?
            .map(FencingToken))
    }

    fn assert_valid(lock_key: &str, lease: Duration) -> Result<(), CoordinationError> {
        if lock_key.is_empty() {
            Err(CoordinationErrorKind::InvalidArgument.error_with_msg("Empty lock key."))?;
        }
        if lease.is_zero() {
            Err(CoordinationErrorKind::InvalidArgument
                .error_with_msg(format!("Lock '{lock_key}' needs a non-zero lease.")))?;
        }
        Ok(())
    }

    fn lost(lock_handle: &LockHandle) -> CoordinationError {
        log::info!(
            "Lock '{}' with token {} was lost before it was released or renewed.",
            lock_handle.lock_key,
            lock_handle.fencing_token
        );
        CoordinationErrorKind::LockAlreadyLost.error_with_msg(format!(
            "Lock '{}' is no longer held with token {}.",
            lock_handle.lock_key, lock_handle.fencing_token
        ))
    }
}
