use crate::{
    addr::Address,
    gatt::{PowerState, MODE_UUID, POWER_CONTROL_UUID},
    retry::{self, RetryPolicy, Retryable},
    station::{Station, StationProvider},
};
use async_trait::async_trait;
use bluer::{
    gatt::{
        remote::{Characteristic, CharacteristicWriteRequest},
        WriteOp,
    },
    AddressType,
};
use std::collections::HashMap;
use thiserror::Error;
use tokio::time::{self, Duration};
use uuid::Uuid;

// BlueZ resolves the remote GATT database asynchronously after connect;
// bound how long we wait for it before giving up on the device.
const SERVICE_RESOLVE_TIMEOUT: Duration = Duration::from_secs(20);
const SERVICE_RESOLVE_POLL: Duration = Duration::from_millis(200);

#[derive(Clone, Error, Debug)]
pub enum LighthouseError {
    #[error("connection failed: {message}")]
    ConnectionFailed {
        kind: bluer::ErrorKind,
        message: String,
    },
    #[error("characteristic {0} not found on device")]
    CharacteristicNotFound(Uuid),
    #[error("write to characteristic {uuid} failed: {message}")]
    WriteFailed {
        uuid: Uuid,
        kind: bluer::ErrorKind,
        message: String,
    },
    #[error("timed out waiting for GATT services to resolve")]
    ServiceResolveTimeout,
    #[error("Bluetooth adapter {0} is not present")]
    AdapterNotPresent(String),
    #[error("not connected")]
    NotConnected,
    #[error("internal error: {0}")]
    Internal(LighthouseInternalError),
}

#[derive(Clone, Error, Debug)]
pub enum LighthouseInternalError {
    #[error("bluer: {kind} {message}")]
    Bluer {
        kind: bluer::ErrorKind,
        message: String,
    },
}

impl From<bluer::Error> for LighthouseError {
    fn from(err: bluer::Error) -> Self {
        Self::Internal(LighthouseInternalError::Bluer {
            kind: err.kind,
            message: err.message,
        })
    }
}

impl Retryable for LighthouseError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. })
    }
}

/// bluez reports a dropped or refused LE connection with these kinds; anything
/// else observed while connecting is terminal.
fn classify_connect_error(err: bluer::Error) -> LighthouseError {
    match err.kind {
        bluer::ErrorKind::ConnectionAttemptFailed | bluer::ErrorKind::Failed => {
            LighthouseError::ConnectionFailed {
                kind: err.kind,
                message: err.message,
            }
        }
        _ => err.into(),
    }
}

/// Connection-phase state of a handle. `Connected` is produced only after
/// characteristic discovery and the device name lookup have succeeded, so a
/// write can never observe an unpopulated characteristic table.
#[derive(Debug)]
enum ConnectionState {
    Disconnected,
    Connected(Connection),
}

#[derive(Debug)]
struct Connection {
    device: bluer::Device,
    name: String,
    characteristics: HashMap<Uuid, Characteristic>,
}

/// One base station's BLE connection handle.
#[derive(Debug)]
pub struct Lighthouse {
    adapter: bluer::Adapter,
    address: Address,
    state: ConnectionState,
}

impl Lighthouse {
    pub fn new(adapter: bluer::Adapter, address: Address) -> Self {
        Self {
            adapter,
            address,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn establish(device: bluer::Device) -> Result<Connection, LighthouseError> {
        let resolved = time::timeout(SERVICE_RESOLVE_TIMEOUT, async {
            while !device.is_services_resolved().await? {
                time::sleep(SERVICE_RESOLVE_POLL).await;
            }
            Ok::<(), bluer::Error>(())
        })
        .await;
        match resolved {
            Ok(result) => result?,
            Err(_) => return Err(LighthouseError::ServiceResolveTimeout),
        }

        let mut characteristics = HashMap::new();
        for service in device.services().await? {
            for characteristic in service.characteristics().await? {
                characteristics.insert(characteristic.uuid().await?, characteristic);
            }
        }

        let name = device.name().await?.unwrap_or_default();

        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Some(mode) = characteristics.get(&MODE_UUID) {
                let value = mode.read().await?;
                tracing::debug!("device mode: {}", hex(&value));
            }
        }

        Ok(Connection {
            device,
            name,
            characteristics,
        })
    }
}

#[async_trait]
impl Station for Lighthouse {
    #[tracing::instrument(skip(self), fields(address = %self.address))]
    async fn connect(&mut self, policy: RetryPolicy) -> Result<(), LighthouseError> {
        if let ConnectionState::Connected(_) = self.state {
            return Ok(());
        }
        let adapter = &self.adapter;
        let address: bluer::Address = self.address.into();
        let device = retry::with_retry(policy, || async move {
            tracing::info!("connecting to {address}");
            adapter
                .connect_device(address, AddressType::LeRandom)
                .await
                .map_err(classify_connect_error)
        })
        .await?;
        let connection = Self::establish(device).await?;
        tracing::info!("connected to {} ({})", connection.name, self.address);
        self.state = ConnectionState::Connected(connection);
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(address = %self.address))]
    async fn disconnect(&mut self) -> Result<(), LighthouseError> {
        match std::mem::replace(&mut self.state, ConnectionState::Disconnected) {
            ConnectionState::Connected(connection) => {
                tracing::info!("disconnecting from {}", connection.name);
                connection.device.disconnect().await?;
                Ok(())
            }
            ConnectionState::Disconnected => Err(LighthouseError::NotConnected),
        }
    }

    #[tracing::instrument(skip(self), fields(address = %self.address))]
    async fn set_power(&mut self, state: PowerState) -> Result<(), LighthouseError> {
        let connection = match &self.state {
            ConnectionState::Connected(connection) => connection,
            ConnectionState::Disconnected => return Err(LighthouseError::NotConnected),
        };
        let characteristic = connection
            .characteristics
            .get(&POWER_CONTROL_UUID)
            .ok_or(LighthouseError::CharacteristicNotFound(POWER_CONTROL_UUID))?;
        characteristic
            .write_ext(
                &[state.to_byte()],
                &CharacteristicWriteRequest {
                    op_type: WriteOp::Request,
                    ..Default::default()
                },
            )
            .await
            .map_err(|err| LighthouseError::WriteFailed {
                uuid: POWER_CONTROL_UUID,
                kind: err.kind,
                message: err.message,
            })?;
        tracing::debug!("wrote {:#04x} to power control", state.to_byte());
        Ok(())
    }

    fn name(&self) -> Option<&str> {
        match &self.state {
            ConnectionState::Connected(connection) => Some(&connection.name),
            ConnectionState::Disconnected => None,
        }
    }
}

/// Mints [Lighthouse] handles bound to one local adapter.
#[derive(Debug, Clone)]
pub struct LighthouseProvider {
    adapter: bluer::Adapter,
}

impl LighthouseProvider {
    /// Opens the given adapter (hci* notation) and powers it on. With `None`
    /// the default adapter is used.
    pub async fn new(adapter_name: Option<&str>) -> Result<Self, LighthouseError> {
        let session = bluer::Session::new().await?;
        let adapter = match adapter_name {
            Some(name) => {
                let known = session.adapter_names().await?;
                if !known.iter().any(|n| n == name) {
                    return Err(LighthouseError::AdapterNotPresent(name.to_owned()));
                }
                session.adapter(name)?
            }
            None => session.default_adapter().await?,
        };
        adapter.set_powered(true).await?;
        tracing::debug!("using Bluetooth adapter {}", adapter.name());
        Ok(Self { adapter })
    }
}

impl StationProvider for LighthouseProvider {
    type Station = Lighthouse;

    fn station(&self, address: Address) -> Lighthouse {
        Lighthouse::new(self.adapter.clone(), address)
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
