pub use rusb;
pub mod baud;
pub mod cancel;
pub mod commands;
pub mod configure;
pub mod devices;
pub mod error;
pub mod linecontrol;
pub mod throughput;

mod device;

pub use device::base::{BulkWriter, Ch34xCommands, ChipVersion, ExecutableCh34x};
pub use device::libusb::device::DeviceSession;
