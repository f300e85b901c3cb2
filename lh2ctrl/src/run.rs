use crate::{fleet, term::Termination};
use lh2ctrl_device::{Address, LighthouseProvider, RetryPolicy};
use std::{future, time::Duration};
use tokio::{signal, time};

#[derive(Debug)]
pub struct RunConfig {
    pub addresses: Vec<Address>,
    pub adapter: String,
    pub retry: RetryPolicy,
    pub global_timeout: u64,
}

/// Main runner: boot the fleet, hold it powered, shut it down.
///
/// Shutdown is invoked at exactly one point, after the boot and hold phases
/// have finished in whatever way they finish, so a signal race can never run
/// it twice.
pub async fn run(config: RunConfig) -> anyhow::Result<()> {
    // Termination listeners go in before any device is touched; a signal
    // arriving mid-boot is held until the hold phase observes it.
    let mut term = Termination::new()?;
    let provider = LighthouseProvider::new(Some(&config.adapter)).await?;

    // An interrupt stops booting early and quietly; remaining devices are
    // left untouched and the run proceeds straight to shutdown.
    let interrupted = tokio::select! {
        res = fleet::boot(&provider, &config.addresses, config.retry) => {
            res?;
            false
        }
        _ = signal::ctrl_c() => {
            tracing::info!("keyboard interrupt caught");
            true
        }
    };

    if !interrupted {
        hold(config.global_timeout, &mut term).await;
    }

    // No interrupt suppression from here on: a half-toggled fleet is worse
    // than a delayed exit, and the installed handlers keep a second
    // interrupt from killing the process mid-shutdown.
    fleet::shutdown(&provider, &config.addresses, config.retry).await?;
    Ok(())
}

/// Keeps the fleet alive for `secs` seconds, or until a termination signal
/// or interrupt when `secs` is zero.
async fn hold(secs: u64, term: &mut Termination) {
    let wait = async {
        if secs != 0 {
            tracing::info!("sleeping for {secs} sec");
            time::sleep(Duration::from_secs(secs)).await;
        } else {
            tracing::info!("sleeping indefinitely");
            future::pending::<()>().await;
        }
    };
    tokio::select! {
        _ = wait => {}
        kind = term.recv() => {
            tracing::info!("signal {kind} caught");
        }
        _ = signal::ctrl_c() => {
            tracing::info!("keyboard interrupt caught");
        }
    }
}
