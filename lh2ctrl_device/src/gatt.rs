use strum::Display;
use uuid::{uuid, Uuid};

/// LHv2 vendor GATT service.
pub const CONTROL_SERVICE_UUID: Uuid = uuid!("00001523-1212-efde-1523-785feabcd124");

/// Power switch characteristic. Takes a single byte, written with response.
pub const POWER_CONTROL_UUID: Uuid = uuid!("00001525-1212-efde-1523-785feabcd124");

/// Current operating mode characteristic, readable.
pub const MODE_UUID: Uuid = uuid!("00001524-1212-efde-1523-785feabcd124");

/// Power switch positions of a base station.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash)]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    /// Wire value written to the power control characteristic.
    pub fn to_byte(self) -> u8 {
        match self {
            Self::On => 0x01,
            Self::Off => 0x00,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PowerState;

    #[test]
    fn power_state_wire_encoding() {
        assert_eq!(PowerState::On.to_byte(), 0x01);
        assert_eq!(PowerState::Off.to_byte(), 0x00);
    }
}
