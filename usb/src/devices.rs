// Plain identification data for the chips we know how to drive. Matching happens against the
// device descriptor only, the chip itself is never queried until it has been opened.
use rusb::DeviceDescriptor;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceIdentity {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }
}

impl From<&DeviceDescriptor> for DeviceIdentity {
    fn from(descriptor: &DeviceDescriptor) -> Self {
        Self::new(descriptor.vendor_id(), descriptor.product_id())
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

pub const SUPPORTED_DEVICES: &[DeviceIdentity] = &[
    DeviceIdentity::new(0x1a86, 0x5523),
    DeviceIdentity::new(0x1a86, 0x7522),
    DeviceIdentity::new(0x1a86, 0x7523),
    DeviceIdentity::new(0x2184, 0x0057),
    DeviceIdentity::new(0x4348, 0x5523),
    DeviceIdentity::new(0x9986, 0x7523),
];

/// Returns the position of the first enumerated identity which appears in `supported`.
pub fn find_supported<'a, I>(enumerated: I, supported: &[DeviceIdentity]) -> Option<usize>
where
    I: IntoIterator<Item = &'a DeviceIdentity>,
{
    enumerated
        .into_iter()
        .position(|identity| supported.contains(identity))
}
