// Wire constants for the CH340 / CH341 vendor protocol. None of this is documented by WCH, the
// values are what the chip actually responds to, so they must not be altered.

/// bmRequestType for a vendor read (Device to Host, Vendor, Device).
pub const VENDOR_READ: u8 = 0xc0;

/// bmRequestType for a vendor write (Host to Device, Vendor, Device).
pub const VENDOR_WRITE: u8 = 0x40;

/// Input clock of the baud rate generator.
pub const CH341_CLKRATE: u32 = 12_000_000;

// Line Control Register bits
pub const LCR_ENABLE_RX: u8 = 0x80;
pub const LCR_ENABLE_TX: u8 = 0x40;
pub const LCR_MARK_SPACE: u8 = 0x20;
pub const LCR_PAR_EVEN: u8 = 0x10;
pub const LCR_ENABLE_PAR: u8 = 0x08;
pub const LCR_STOP_BITS_2: u8 = 0x04;
pub const LCR_CS8: u8 = 0x03;
pub const LCR_CS7: u8 = 0x02;
pub const LCR_CS6: u8 = 0x01;
pub const LCR_CS5: u8 = 0x00;

/// Break register bit which, when cleared, holds the line in a break state.
pub const NBREAK_BITS: u8 = 0x01;

/// Modem output value which asserts DTR and RTS.
pub const MODEM_OUT_ASSERT: u16 = 0x009f;

/// Undocumented initialisation write, required before the LCR is accepted.
pub const INIT_REGISTER_VALUE: u16 = 0x0f2c;
pub const INIT_REGISTER_INDEX: u16 = 0x0004;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Request {
    ReadVersion,
    WriteRegister,
    ReadRegister,
    SerialInit,
    ModemControl,
}

impl Request {
    pub fn id(&self) -> u8 {
        match self {
            Request::ReadVersion => 0x5f,
            Request::WriteRegister => 0x9a,
            Request::ReadRegister => 0x95,
            Request::SerialInit => 0xa1,
            Request::ModemControl => 0xa4,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    Break,
    Prescaler,
    Divisor,
    LineControl,
    LineControl2,
    FlowControl,
}

impl Register {
    pub fn address(&self) -> u8 {
        match self {
            Register::Break => 0x05,
            Register::Prescaler => 0x12,
            Register::Divisor => 0x13,
            Register::LineControl => 0x18,
            Register::LineControl2 => 0x25,
            Register::FlowControl => 0x27,
        }
    }

    /// Combines two registers into the single 16bit address a write can target, the chip
    /// applies the same value to both.
    pub fn pair(high: Register, low: Register) -> u16 {
        ((high.address() as u16) << 8) | low.address() as u16
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlowControl {
    None,
    RtsCts,
}

impl FlowControl {
    pub fn id(&self) -> u16 {
        match self {
            FlowControl::None => 0x00,
            FlowControl::RtsCts => 0x01,
        }
    }
}
