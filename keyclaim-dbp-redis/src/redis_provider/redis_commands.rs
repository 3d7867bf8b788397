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

//! Redis commands sent by the facades.

use keyclaim_dbp::time::as_ttl_millis;
use redis::Cmd;
use std::time::Duration;

/// Builders of the Redis commands sent by the facades.
///
/// Every ttl is sent in milliseconds.
pub struct RedisCommands {}

impl RedisCommands {
    /// `GET key`
    pub fn get(key: &str) -> Cmd {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        cmd
    }

    /// `SET key value [PX ttl]`. Without a ttl any previous expiry is
    /// cleared.
    pub fn set(key: &str, value: &str, time_to_live: Option<Duration>) -> Cmd {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(time_to_live) = time_to_live {
            cmd.arg("PX").arg(as_ttl_millis(time_to_live));
        }
        cmd
    }

    /// `SET key value NX PX ttl`: value and expiry in a single atomic write.
    pub fn set_if_absent(key: &str, value: &str, time_to_live: Duration) -> Cmd {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(as_ttl_millis(time_to_live));
        cmd
    }

    /// `EXISTS key`
    pub fn exists(key: &str) -> Cmd {
        let mut cmd = redis::cmd("EXISTS");
        cmd.arg(key);
        cmd
    }

    /// `DEL key`
    pub fn delete(key: &str) -> Cmd {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(key);
        cmd
    }

    /// `PEXPIRE key ttl`
    pub fn expire(key: &str, time_to_live: Duration) -> Cmd {
        let mut cmd = redis::cmd("PEXPIRE");
        cmd.arg(key).arg(as_ttl_millis(time_to_live));
        cmd
    }

    /// `PTTL key`
    pub fn time_to_live(key: &str) -> Cmd {
        let mut cmd = redis::cmd("PTTL");
        cmd.arg(key);
        cmd
    }

    /// `INCR key`
    pub fn increment(key: &str) -> Cmd {
        let mut cmd = redis::cmd("INCR");
        cmd.arg(key);
        cmd
    }
}
