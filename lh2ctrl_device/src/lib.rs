pub mod addr;
pub mod gatt;
pub mod lighthouse;
pub mod retry;
pub mod station;

pub use addr::Address;
pub use lighthouse::{Lighthouse, LighthouseError, LighthouseProvider};
pub use retry::RetryPolicy;
pub use station::{Station, StationProvider};

// Callers match on `bluer::ErrorKind` when inspecting transport failures.
pub use bluer;
