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

//! Command line parsing.

use std::time::Duration;

/// A single invocation of the binary.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Print a new version identifier for today.
    Version { type_tag: String },
    /// Allocate and print the next value of a counter.
    Counter {
        counter_key: String,
        time_to_live: Duration,
    },
    /// Hold a lock until signaled.
    Hold {
        lock_key: String,
        lease: Option<Duration>,
    },
    /// Print the fencing token of the current lock holder.
    Holder { lock_key: String },
}

impl Command {
    /// Parse the arguments following the binary name.
    pub fn parse(mut args: impl Iterator<Item = String>) -> Option<Self> {
        let command = match args.next()?.as_str() {
            "version" => Self::Version {
                type_tag: args.next()?,
            },
            "counter" => Self::Counter {
                counter_key: args.next()?,
                time_to_live: Self::parse_seconds(&args.next()?)?,
            },
            "hold" => Self::Hold {
                lock_key: args.next()?,
                lease: match args.next() {
                    Some(seconds) => Some(Self::parse_seconds(&seconds)?),
                    None => None,
                },
            },
            "holder" => Self::Holder {
                lock_key: args.next()?,
            },
            _ => None?,
        };
        // Trailing arguments are a usage error.
        args.next().is_none().then_some(command)
    }

    fn parse_seconds(value: &str) -> Option<Duration> {
        value
            .parse::<u64>()
            .ok()
            .filter(|seconds| *seconds > 0)
            .map(Duration::from_secs)
    }

    /// Usage instructions for `cli_name`.
    pub fn usage(cli_name: &str) -> String {
        format!(
            "{cli_name} - Keyclaim CLI

Usage:
    {cli_name} version [type]
    {cli_name} counter [key] [ttl-seconds]
    {cli_name} hold [lock-key] <lease-seconds>
    {cli_name} holder [lock-key]

Example
    {cli_name} version invoice
"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Option<Command> {
        Command::parse(args.iter().map(ToString::to_string))
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse(&["version", "demo"]),
            Some(Command::Version {
                type_tag: "demo".to_string()
            })
        );
        assert_eq!(
            parse(&["counter", "c", "60"]),
            Some(Command::Counter {
                counter_key: "c".to_string(),
                time_to_live: Duration::from_secs(60)
            })
        );
        assert_eq!(
            parse(&["hold", "l"]),
            Some(Command::Hold {
                lock_key: "l".to_string(),
                lease: None
            })
        );
        assert_eq!(
            parse(&["hold", "l", "5"]),
            Some(Command::Hold {
                lock_key: "l".to_string(),
                lease: Some(Duration::from_secs(5))
            })
        );
        assert_eq!(
            parse(&["holder", "l"]),
            Some(Command::Holder {
                lock_key: "l".to_string()
            })
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse(&[]), None);
        assert_eq!(parse(&["unknown"]), None);
        assert_eq!(parse(&["version"]), None);
        assert_eq!(parse(&["version", "a", "b"]), None);
        assert_eq!(parse(&["counter", "c", "0"]), None);
        assert_eq!(parse(&["counter", "c", "-1"]), None);
        assert_eq!(parse(&["hold", "l", "soon"]), None);
    }
}
