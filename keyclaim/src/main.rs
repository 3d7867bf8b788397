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

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod command;

use self::command::Command;
use keyclaim_core::AppConfig;
use keyclaim_core::CoordinationError;
use keyclaim_core::KeyClaim;
use keyclaim_core::coord::LockHandle;
use keyclaim_core::coord::LockManager;
use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::SignalKind;
use tokio::signal::unix::signal;

/// First delay between attempts to acquire a held lock.
const INITIAL_BACKOFF: Duration = Duration::from_millis(50);
/// Longest delay between attempts to acquire a held lock.
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Application main entrypoint.
fn main() -> ExitCode {
    if let Err(e) = init_logger() {
        eprintln!("Failed to initialize logging: {e:?}");
        return ExitCode::FAILURE;
    }
    let mut args = std::env::args();
    let cli_name = args.next().unwrap_or_else(|| env!("CARGO_PKG_NAME").to_owned());
    let Some(command) = Command::parse(args) else {
        eprintln!("{}", Command::usage(&cli_name));
        return ExitCode::FAILURE;
    };
    let app_config = match AppConfig::new(env!("CARGO_PKG_NAME")) {
        Ok(app_config) => Arc::new(app_config),
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime.block_on(run_async(app_config, command)),
        Err(e) => {
            log::error!("Failed to start async runtime: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize the logging system and apply filters.
fn init_logger() -> Result<(), log::SetLoggerError> {
    env_logger::builder()
        // Set default log level
        .filter_level(log::LevelFilter::Info)
        // Customize logging for dependencies
        .filter(Some("redis"), log::LevelFilter::Info)
        .filter(Some("keyclaim_dbp"), log::LevelFilter::Info)
        .write_style(env_logger::fmt::WriteStyle::Auto)
        // Standard output is reserved for command results.
        .target(env_logger::fmt::Target::Stderr)
        .is_test(false)
        .parse_env(
            env_logger::Env::new()
                .filter("LOG_LEVEL")
                .write_style("LOG_STYLE"),
        )
        .try_init()
}

/// Async code entry point.
async fn run_async(app_config: Arc<AppConfig>, command: Command) -> ExitCode {
    let keyclaim = match KeyClaim::new(&app_config).await {
        Ok(keyclaim) => keyclaim,
        Err(e) => {
            log::error!("Failed to connect to store: {e}");
            return ExitCode::FAILURE;
        }
    };
    let res = match command {
        Command::Version { type_tag } => keyclaim
            .version_generator()
            .generate_version_now(&type_tag)
            .await
            .map(|version_id| println!("{version_id}")),
        Command::Counter {
            counter_key,
            time_to_live,
        } => keyclaim
            .counter_allocator()
            .allocate(&(app_config.backend.namespace().to_owned() + &counter_key), time_to_live)
            .await
            .map(|value| println!("{value}")),
        Command::Hold { lock_key, lease } => {
            let lease = lease.unwrap_or_else(|| app_config.lock.lease());
            let renew_interval = app_config.lock.renew_interval_for(lease);
            hold(
                keyclaim.lock_manager(),
                &lock_key,
                lease,
                renew_interval,
                block_until_signaled(),
            )
            .await
        }
        Command::Holder { lock_key } => keyclaim
            .lock_manager()
            .holder(&lock_key)
            .await
            .map(|fencing_token| match fencing_token {
                Some(fencing_token) => println!("{fencing_token}"),
                None => log::info!("Lock '{lock_key}' is free."),
            }),
    };
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Acquire `lock_key` and keep it until `shutdown` completes.
async fn hold(
    lock_manager: &LockManager,
    lock_key: &str,
    lease: Duration,
    renew_interval: Duration,
    shutdown: impl Future<Output = ()>,
) -> Result<(), CoordinationError> {
    let mut signals_future = std::pin::pin!(shutdown);
    let mut lock_handle = tokio::select! {
        res = acquire_with_backoff(lock_manager, lock_key, lease) => res?,
        _ = &mut signals_future => {
            log::info!("Stopped waiting for lock '{lock_key}'.");
            return Ok(());
        },
    };
    println!("{}", lock_handle.fencing_token());
    loop {
        tokio::select! {
            _ = tokio::time::sleep(renew_interval) => {
                renew_or_give_up(lock_manager, &mut lock_handle, lease).await?;
            },
            _ = &mut signals_future => {
                log::trace!("signals_future finished");
                break;
            },
        }
    }
    lock_manager.release(lock_handle).await?;
    log::info!("Released lock '{lock_key}'.");
    Ok(())
}

/// Retry acquisition with exponential backoff until the lock is free.
async fn acquire_with_backoff(
    lock_manager: &LockManager,
    lock_key: &str,
    lease: Duration,
) -> Result<LockHandle, CoordinationError> {
    let mut backoff = INITIAL_BACKOFF;
    loop {
        match lock_manager.try_acquire(lock_key, lease).await {
            Ok(Some(lock_handle)) => return Ok(lock_handle),
            Ok(None) => {
                log::debug!(
                    "Lock '{lock_key}' is held. Retrying in {} ms.",
                    backoff.as_millis()
                );
            }
            Err(e) if e.is_retryable() => {
                log::warn!("Retrying in {} ms: {e}", backoff.as_millis());
            }
            Err(e) => return Err(e),
        }
        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

/// Renew the lease. Transient store failures are tolerated while the current
/// lease still has time left.
async fn renew_or_give_up(
    lock_manager: &LockManager,
    lock_handle: &mut LockHandle,
    lease: Duration,
) -> Result<(), CoordinationError> {
    match lock_manager.renew(lock_handle, lease).await {
        Err(e) if e.is_retryable() && !lock_handle.remaining().is_zero() => {
            log::warn!(
                "Renewal failed with {} ms of lease left: {e}",
                lock_handle.remaining().as_millis()
            );
            Ok(())
        }
        res => res,
    }
}

/// Block until SIGTERM or SIGINT is recieved.
async fn block_until_signaled() {
    let (mut sigint, mut sigterm) = match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
        (Err(e), _) | (_, Err(e)) => {
            log::warn!("Unable to listen for signals: {e}");
            return std::future::pending().await;
        }
    };
    tokio::select! {
        _ = sigterm.recv() => {
            log::debug!("SIGTERM recieved.")
        },
        _ = sigint.recv() => {
            log::debug!("SIGINT recieved.")
        },
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyclaim_core::CoordinationErrorKind;
    use tokio::time::Instant;
    use tokio::time::sleep;

    fn init_logger() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    }

    async fn new_keyclaim() -> Arc<KeyClaim> {
        KeyClaim::new(&AppConfig::defaults().unwrap()).await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_with_backoff_waits_for_lease_expiry() {
        init_logger();
        let keyclaim = new_keyclaim().await;
        let lock_manager = keyclaim.lock_manager();
        let other = lock_manager
            .try_acquire("job", Duration::from_secs(3))
            .await
            .unwrap()
            .unwrap();
        let started = Instant::now();
        let lock_handle = acquire_with_backoff(lock_manager, "job", Duration::from_secs(10))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert!(started.elapsed() <= Duration::from_secs(3) + MAX_BACKOFF);
        assert_ne!(lock_handle.fencing_token(), other.fencing_token());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_renews_beyond_lease_and_releases_on_shutdown() {
        init_logger();
        let keyclaim = new_keyclaim().await;
        let lock_manager = keyclaim.lock_manager();
        let (res, holder_while_held) = tokio::join!(
            hold(
                lock_manager,
                "job",
                Duration::from_secs(3),
                Duration::from_secs(1),
                sleep(Duration::from_secs(10)),
            ),
            async {
                sleep(Duration::from_secs(8)).await;
                lock_manager.holder("job").await.unwrap()
            }
        );
        res.unwrap();
        assert!(holder_while_held.is_some());
        assert!(lock_manager.holder("job").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_fails_when_lock_is_lost() {
        init_logger();
        let keyclaim = new_keyclaim().await;
        let lock_manager = keyclaim.lock_manager();
        let started = Instant::now();
        let (res, ()) = tokio::join!(
            hold(
                lock_manager,
                "job",
                Duration::from_secs(3),
                Duration::from_secs(1),
                sleep(Duration::from_secs(60)),
            ),
            async {
                sleep(Duration::from_millis(1500)).await;
                // Simulates expiry of the lease in the store.
                keyclaim
                    .store()
                    .delete(&lock_manager.store_key("job"))
                    .await
                    .unwrap();
            }
        );
        let e = res.unwrap_err();
        assert_eq!(e.kind(), &CoordinationErrorKind::LockAlreadyLost);
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_stops_waiting_on_shutdown() {
        init_logger();
        let keyclaim = new_keyclaim().await;
        let lock_manager = keyclaim.lock_manager();
        let other = lock_manager
            .try_acquire("job", Duration::from_secs(60))
            .await
            .unwrap()
            .unwrap();
        hold(
            lock_manager,
            "job",
            Duration::from_secs(3),
            Duration::from_secs(1),
            sleep(Duration::from_secs(1)),
        )
        .await
        .unwrap();
        assert_eq!(
            lock_manager.holder("job").await.unwrap().as_ref(),
            Some(other.fencing_token())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_renew_or_give_up() {
        init_logger();
        let keyclaim = new_keyclaim().await;
        let lock_manager = keyclaim.lock_manager();
        let mut lock_handle = lock_manager
            .try_acquire("job", Duration::from_secs(1))
            .await
            .unwrap()
            .unwrap();
        renew_or_give_up(lock_manager, &mut lock_handle, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(lock_handle.lease(), Duration::from_secs(5));
        keyclaim
            .store()
            .delete(&lock_manager.store_key("job"))
            .await
            .unwrap();
        let e = renew_or_give_up(lock_manager, &mut lock_handle, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(e.kind(), &CoordinationErrorKind::LockAlreadyLost);
    }
}
