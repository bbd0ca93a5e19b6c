use crate::commands::Request;
use crate::error::TransportError;
use log::debug;
use std::fmt;
use std::time::Duration;

// The raw transport, everything the chip understands is built on top of these two calls. The
// implementor owns the timeout.
pub trait ExecutableCh34x {
    fn read_control(
        &mut self,
        request: Request,
        value: u16,
        index: u16,
        buf: &mut [u8],
    ) -> Result<usize, TransportError>;

    fn write_control(
        &mut self,
        request: Request,
        value: u16,
        index: u16,
        data: &[u8],
    ) -> Result<usize, TransportError>;
}

// These are the commands which can be executed, but the transport must be implemented..
pub trait Ch34xCommands: ExecutableCh34x {
    fn read_chip_version(&mut self, interface: u16) -> Result<ChipVersion, TransportError> {
        let mut buf = [0; 2];
        let length = self.read_control(Request::ReadVersion, 0, interface, &mut buf)?;
        if length < buf.len() {
            return Err(TransportError::ShortRead {
                expected: buf.len(),
                actual: length,
            });
        }
        Ok(ChipVersion(buf[0], buf[1]))
    }

    fn read_register(&mut self, address: u16) -> Result<[u8; 2], TransportError> {
        let mut buf = [0; 2];
        let length = self.read_control(Request::ReadRegister, address, 0, &mut buf)?;
        if length < buf.len() {
            return Err(TransportError::ShortRead {
                expected: buf.len(),
                actual: length,
            });
        }
        Ok(buf)
    }

    fn write_register(&mut self, address: u16, value: u16) -> Result<(), TransportError> {
        debug!("Writing register 0x{:04x} = 0x{:04x}", address, value);
        self.write_control(Request::WriteRegister, address, value, &[])?;
        Ok(())
    }

    fn serial_init(&mut self) -> Result<(), TransportError> {
        self.write_control(Request::SerialInit, 0, 0, &[])?;
        Ok(())
    }

    fn set_modem_control(&mut self, value: u16) -> Result<(), TransportError> {
        self.write_control(Request::ModemControl, value, 0, &[])?;
        Ok(())
    }
}

/// Anything we can push bulk data at.
pub trait BulkWriter {
    fn write_bulk(&mut self, data: &[u8], timeout: Duration) -> Result<usize, TransportError>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChipVersion(pub u8, pub u8);

impl fmt::Display for ChipVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X} {:02X}", self.0, self.1)
    }
}
