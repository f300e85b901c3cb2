use crate::{
    addr::Address, gatt::PowerState, lighthouse::LighthouseError, retry::RetryPolicy,
};
use async_trait::async_trait;

/// One controllable base station behind a BLE connection.
#[async_trait]
pub trait Station {
    /// Establishes the connection, retrying per `policy`.
    async fn connect(&mut self, policy: RetryPolicy) -> Result<(), LighthouseError>;

    /// Closes the connection. Errors when not connected.
    async fn disconnect(&mut self) -> Result<(), LighthouseError>;

    /// Writes the power switch value with acknowledgment.
    async fn set_power(&mut self, state: PowerState) -> Result<(), LighthouseError>;

    /// Device name learned on connect, if any.
    fn name(&self) -> Option<&str>;
}

/// Mints station handles. Each connect/operate/disconnect cycle gets a fresh
/// handle; handles are never reused across cycles.
pub trait StationProvider {
    type Station: Station;

    fn station(&self, address: Address) -> Self::Station;
}
