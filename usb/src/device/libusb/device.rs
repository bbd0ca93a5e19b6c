use crate::commands::{Request, VENDOR_READ, VENDOR_WRITE};
use crate::device::base::{BulkWriter, Ch34xCommands, ExecutableCh34x};
use crate::device::libusb::claim::{ClaimedInterfaces, InterfaceClaim};
use crate::devices::{find_supported, DeviceIdentity};
use crate::error::{ConnectError, TransportError};
use log::{debug, info};
use rusb::{ConfigDescriptor, Device, DeviceHandle, Direction, GlobalContext, TransferType};
use std::time::Duration;

/// Interfaces the CH34x may expose, a driver is detached from (and a claim attempted on) each.
const INTERFACES: [u8; 3] = [0, 1, 2];

const CONTROL_TIMEOUT: Duration = Duration::from_millis(1000);

// An open device, its claimed interfaces, and the endpoint we'll be streaming to. Interfaces are
// released when this is dropped, and the handle closes straight after.
pub struct DeviceSession {
    interfaces: ClaimedInterfaces<DeviceHandle<GlobalContext>>,
    identity: DeviceIdentity,
    endpoint_out: u8,
}

impl DeviceSession {
    /// Opens the first enumerated device listed in `supported`.
    pub fn open(supported: &[DeviceIdentity]) -> Result<Self, ConnectError> {
        let mut found: Vec<(Device<GlobalContext>, DeviceIdentity)> = Vec::new();
        for device in rusb::devices()?.iter() {
            if let Ok(descriptor) = device.device_descriptor() {
                let identity = DeviceIdentity::from(&descriptor);
                debug!("Found device {} at {:?}", identity, device);
                found.push((device, identity));
            }
        }

        let position = find_supported(found.iter().map(|(_, identity)| identity), supported)
            .ok_or(ConnectError::DeviceNotFound)?;
        let (device, identity) = found.swap_remove(position);
        info!(
            "Matched {} on bus {} address {}",
            identity,
            device.bus_number(),
            device.address()
        );

        let (interfaces, endpoint_out) = attach(device.open()?, || {
            Ok(find_bulk_out(&device.active_config_descriptor()?))
        })?;
        debug!("Using bulk OUT endpoint 0x{:02x}", endpoint_out);

        Ok(Self {
            interfaces,
            identity,
            endpoint_out,
        })
    }

    pub fn identity(&self) -> DeviceIdentity {
        self.identity
    }

    pub fn endpoint_out(&self) -> u8 {
        self.endpoint_out
    }

    pub fn claimed_interfaces(&self) -> &[u8] {
        self.interfaces.claimed()
    }

    fn handle(&self) -> &DeviceHandle<GlobalContext> {
        self.interfaces.handle()
    }
}

/// Claims the interfaces on `handle`, then asks `discover` for the bulk OUT endpoint. Should
/// discovery fail, the claimed interfaces are released before the error is returned.
fn attach<H, F>(handle: H, discover: F) -> Result<(ClaimedInterfaces<H>, u8), ConnectError>
where
    H: InterfaceClaim,
    F: FnOnce() -> Result<Option<u8>, rusb::Error>,
{
    let interfaces = ClaimedInterfaces::claim(handle, &INTERFACES);
    let endpoint = discover()?.ok_or(ConnectError::EndpointNotFound)?;
    Ok((interfaces, endpoint))
}

impl ExecutableCh34x for DeviceSession {
    fn read_control(
        &mut self,
        request: Request,
        value: u16,
        index: u16,
        buf: &mut [u8],
    ) -> Result<usize, TransportError> {
        debug!("Control IN {:?} value 0x{:04x} index 0x{:04x}", request, value, index);
        let length = self.handle().read_control(
            VENDOR_READ,
            request.id(),
            value,
            index,
            buf,
            CONTROL_TIMEOUT,
        )?;
        Ok(length)
    }

    fn write_control(
        &mut self,
        request: Request,
        value: u16,
        index: u16,
        data: &[u8],
    ) -> Result<usize, TransportError> {
        debug!("Control OUT {:?} value 0x{:04x} index 0x{:04x}", request, value, index);
        let length = self.handle().write_control(
            VENDOR_WRITE,
            request.id(),
            value,
            index,
            data,
            CONTROL_TIMEOUT,
        )?;
        Ok(length)
    }
}

impl Ch34xCommands for DeviceSession {}

impl BulkWriter for DeviceSession {
    fn write_bulk(&mut self, data: &[u8], timeout: Duration) -> Result<usize, TransportError> {
        Ok(self.handle().write_bulk(self.endpoint_out, data, timeout)?)
    }
}

fn find_bulk_out(config: &ConfigDescriptor) -> Option<u8> {
    let mut settings: Vec<_> = config
        .interfaces()
        .flat_map(|interface| interface.descriptors())
        .collect();
    settings.sort_by_key(|setting| (setting.interface_number(), setting.setting_number()));

    first_bulk_out(settings.iter().flat_map(|setting| {
        setting
            .endpoint_descriptors()
            .map(|endpoint| (endpoint.transfer_type(), endpoint.direction(), endpoint.address()))
    }))
}

/// Picks the first bulk OUT endpoint from (type, direction, address) triples, in the order given.
fn first_bulk_out<I>(endpoints: I) -> Option<u8>
where
    I: IntoIterator<Item = (TransferType, Direction, u8)>,
{
    endpoints
        .into_iter()
        .find(|(transfer_type, direction, _)| {
            *transfer_type == TransferType::Bulk && *direction == Direction::Out
        })
        .map(|(_, _, address)| address)
}
