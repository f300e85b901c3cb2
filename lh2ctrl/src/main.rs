use clap::Parser;
use lh2ctrl_device::{Address, RetryPolicy};
use std::time::Duration;
use tracing_subscriber::prelude::*;

mod fleet;
mod run;
mod term;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Wakes up and runs Valve v2 lighthouse(s) using BT LE power management",
    long_about = None
)]
struct Cli {
    /// MAC address(es) of the lighthouse(s) (in format aa:bb:cc:dd:ee:ff)
    #[arg(required = true)]
    lh_mac: Vec<Address>,

    /// Time (sec) how long to keep the lighthouse(s) alive (0=forever)
    #[arg(short, long = "global_timeout", default_value_t = 0)]
    global_timeout: u64,

    /// The Bluetooth interface on which to make the connection. 0 means
    /// /dev/hci0, 1 means /dev/hci1 and so on
    #[arg(short, long, default_value_t = 0)]
    interface: u16,

    /// Number of tries to set up a connection
    #[arg(long = "try_count", default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    try_count: u32,

    /// Sleep time (sec) when reconnecting
    #[arg(long = "try_pause", default_value_t = 2)]
    try_pause: u64,

    /// Increase verbosity of the log to stdout
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let module_filter = tracing_subscriber::filter::Targets::new()
        .with_target("lh2ctrl", level)
        .with_target("lh2ctrl_device", level);
    let subscriber = tracing_subscriber::registry()
        .with(module_filter)
        .with(tracing_subscriber::fmt::Layer::default());
    tracing::subscriber::set_global_default(subscriber)?;

    run::run(run::RunConfig {
        addresses: args.lh_mac,
        adapter: format!("hci{}", args.interface),
        retry: RetryPolicy::new(args.try_count, Duration::from_secs(args.try_pause)),
        global_timeout: args.global_timeout,
    })
    .await
}
