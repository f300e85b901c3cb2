use lh2ctrl_device::{
    gatt::PowerState, Address, LighthouseError, RetryPolicy, Station, StationProvider,
};
use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum FleetError {
    #[error("device {address}: {source}")]
    Station {
        address: Address,
        source: LighthouseError,
    },
}

/// Powers on every lighthouse in the list.
pub async fn boot<P: StationProvider>(
    provider: &P,
    addresses: &[Address],
    policy: RetryPolicy,
) -> Result<(), FleetError> {
    set_power_all(provider, addresses, policy, PowerState::On).await
}

/// Powers off every lighthouse in the list.
pub async fn shutdown<P: StationProvider>(
    provider: &P,
    addresses: &[Address],
    policy: RetryPolicy,
) -> Result<(), FleetError> {
    set_power_all(provider, addresses, policy, PowerState::Off).await
}

/// Devices are handled strictly in the order given, one full
/// connect/write/disconnect cycle each; the first failure aborts the
/// remaining devices.
#[tracing::instrument(skip(provider, addresses), fields(devices = addresses.len()))]
async fn set_power_all<P: StationProvider>(
    provider: &P,
    addresses: &[Address],
    policy: RetryPolicy,
    state: PowerState,
) -> Result<(), FleetError> {
    for &address in addresses {
        let mut station = provider.station(address);
        let result = async {
            station.connect(policy).await?;
            let name = station.name().unwrap_or("<unknown>").to_owned();
            match state {
                PowerState::On => tracing::info!("booting up {name}"),
                PowerState::Off => tracing::info!("shutting down {name}"),
            }
            station.set_power(state).await?;
            station.disconnect().await
        }
        .await;
        result.map_err(|source| FleetError::Station { address, source })?;
    }
    Ok(())
}
