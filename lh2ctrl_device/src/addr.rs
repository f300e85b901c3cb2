use macaddr::MacAddr6;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};
use thiserror::Error;

/// Bluetooth device address.
///
/// The serialized representation is a string in colon-hexadecimal notation,
/// e.g. `aa:bb:cc:dd:ee:ff`.
#[derive(Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Address(MacAddr6);

impl Address {
    /// Creates a new address with the specified octets.
    pub fn new(octets: [u8; 6]) -> Self {
        Self(octets.into())
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0.into_array()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// Invalid Bluetooth address error.
#[derive(Clone, Debug, Error)]
#[error("invalid Bluetooth address: {0}")]
pub struct InvalidAddressError(pub String);

impl FromStr for Address {
    type Err = InvalidAddressError;

    fn from_str(s: &str) -> Result<Self, InvalidAddressError> {
        s.parse::<MacAddr6>()
            .map(Self)
            .map_err(|_| InvalidAddressError(s.to_string()))
    }
}

impl From<MacAddr6> for Address {
    fn from(addr: MacAddr6) -> Self {
        Self(addr)
    }
}

impl From<Address> for MacAddr6 {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl From<[u8; 6]> for Address {
    fn from(octets: [u8; 6]) -> Self {
        Self::new(octets)
    }
}

impl From<Address> for [u8; 6] {
    fn from(addr: Address) -> Self {
        addr.octets()
    }
}

/// Interop [bluer::Address] with [Address].
impl From<bluer::Address> for Address {
    fn from(addr: bluer::Address) -> Self {
        Self::new(addr.0)
    }
}

impl From<Address> for bluer::Address {
    fn from(addr: Address) -> Self {
        bluer::Address::new(addr.octets())
    }
}
