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

//! Redis reply mapping.

use keyclaim_dbp::coord::CoordinationError;
use keyclaim_dbp::coord::CoordinationErrorKind;
use keyclaim_dbp::coord::TimeToLive;
use redis::ErrorKind;
use redis::RedisError;
use std::time::Duration;

/// Redis reply mapper.
pub struct RedisResultMapper {}

impl RedisResultMapper {
    /// Classify a client error.
    ///
    /// Anything that suggests the server can't be reached right now becomes
    /// [CoordinationErrorKind::StoreUnavailable]. Everything else means the
    /// reply didn't fit the request.
    pub fn into_coordination_error(e: RedisError) -> CoordinationError {
        let unavailable = matches!(
            e.kind(),
            ErrorKind::IoError
                | ErrorKind::BusyLoadingError
                | ErrorKind::TryAgain
                | ErrorKind::ClusterDown
                | ErrorKind::MasterDown
        ) || e.is_timeout()
            || e.is_connection_dropped()
            || e.is_connection_refusal();
        if unavailable {
            if log::log_enabled!(log::Level::Debug) {
                log::debug!("Redis unavailable: {e:?}");
            }
            CoordinationErrorKind::StoreUnavailable.error_with_msg(e.to_string())
        } else {
            log::warn!("Unexpected Redis reply: {e:?}");
            CoordinationErrorKind::StoreProtocolError.error_with_msg(e.to_string())
        }
    }

    /// Map the integer reply of commands that answer `1` or `0`.
    pub fn into_flag(reply: i64) -> Result<bool, CoordinationError> {
        match reply {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CoordinationErrorKind::StoreProtocolError
                .error_with_msg(format!("Expected 0 or 1, but got {other}."))),
        }
    }

    /// Map the reply of `PTTL`.
    ///
    /// `-2` means that the key does not exist and `-1` that it never expires.
    pub fn into_time_to_live(reply: i64) -> Result<TimeToLive, CoordinationError> {
        match reply {
            -2 => Ok(TimeToLive::Absent),
            -1 => Ok(TimeToLive::Persistent),
            millis if millis >= 0 => Ok(TimeToLive::Expires(Duration::from_millis(
                millis.unsigned_abs(),
            ))),
            other => Err(CoordinationErrorKind::StoreProtocolError
                .error_with_msg(format!("Unexpected PTTL reply {other}."))),
        }
    }

    /// Map the reply of `SET .. NX`: `OK` when stored and nil otherwise.
    pub fn into_stored(reply: Option<String>) -> Result<bool, CoordinationError> {
        match reply.as_deref() {
            None => Ok(false),
            Some("OK") => Ok(true),
            Some(other) => Err(CoordinationErrorKind::StoreProtocolError
                .error_with_msg(format!("Unexpected SET reply '{other}'."))),
        }
    }
}
