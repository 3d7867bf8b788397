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

//! Server side Lua scripts.

use redis::Script;

/// Server side Lua scripts.
///
/// [Script] sends `EVALSHA` and falls back to `EVAL` (which caches the script)
/// when the server doesn't know the script yet.
pub struct RedisScripts {
    /// `KEYS[1]`: key, `ARGV[1]`: expected value. Returns `1` when deleted.
    pub compare_and_delete: Script,
    /// `KEYS[1]`: key, `ARGV[1]`: expected value, `ARGV[2]`: ttl in ms.
    /// Returns `1` when the ttl was replaced.
    pub compare_and_expire: Script,
}

impl RedisScripts {
    const LUA_COMPARE_AND_DELETE: &'static str = r#"
        if redis.call('GET', KEYS[1]) == ARGV[1] then
            return redis.call('DEL', KEYS[1])
        end
        return 0
    "#;

    const LUA_COMPARE_AND_EXPIRE: &'static str = r#"
        if redis.call('GET', KEYS[1]) == ARGV[1] then
            return redis.call('PEXPIRE', KEYS[1], ARGV[2])
        end
        return 0
    "#;
}

impl Default for RedisScripts {
    fn default() -> Self {
        Self {
            compare_and_delete: Script::new(Self::LUA_COMPARE_AND_DELETE),
            compare_and_expire: Script::new(Self::LUA_COMPARE_AND_EXPIRE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Position of `needle` in `script`, failing when absent.
    fn position_of(script: &str, needle: &str) -> usize {
        script
            .find(needle)
            .unwrap_or_else(|| panic!("'{needle}' missing from script: {script}"))
    }

    #[test]
    fn test_compare_and_delete_compares_before_delete() {
        let script = RedisScripts::LUA_COMPARE_AND_DELETE;
        let compare = position_of(script, "redis.call('GET', KEYS[1]) == ARGV[1]");
        let delete = position_of(script, "redis.call('DEL', KEYS[1])");
        assert!(compare < delete);
        assert!(!script.contains("ARGV[2]"));
        assert!(position_of(script, "return 0") > delete);
    }

    #[test]
    fn test_compare_and_expire_compares_before_expire() {
        let script = RedisScripts::LUA_COMPARE_AND_EXPIRE;
        let compare = position_of(script, "redis.call('GET', KEYS[1]) == ARGV[1]");
        let expire = position_of(script, "redis.call('PEXPIRE', KEYS[1], ARGV[2])");
        assert!(compare < expire);
        assert!(!script.contains("DEL"));
        assert!(position_of(script, "return 0") > expire);
    }

    #[test]
    fn test_scripts_are_distinct() {
        let scripts = RedisScripts::default();
        assert_ne!(
            scripts.compare_and_delete.get_hash(),
            scripts.compare_and_expire.get_hash()
        );
    }
}
