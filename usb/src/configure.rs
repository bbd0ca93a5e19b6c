use crate::baud::{calculate_baud_registers, BaudRegisters};
use crate::commands::{
    FlowControl, Register, INIT_REGISTER_INDEX, INIT_REGISTER_VALUE, MODEM_OUT_ASSERT,
};
use crate::device::base::Ch34xCommands;
use crate::error::{ConfigError, TransportError};
use crate::linecontrol::LineControl;
use log::{debug, info};
use strum::{Display, EnumIter};

/// Interface the version request is addressed to.
const VERSION_INTERFACE: u16 = 0;

// Listed in the order they're sent to the chip.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum ConfigStep {
    #[strum(to_string = "read version")]
    ReadVersion,
    #[strum(to_string = "serial init")]
    SerialInit,
    #[strum(to_string = "init register")]
    InitRegister,
    #[strum(to_string = "line control")]
    LineControl,
    #[strum(to_string = "flow control")]
    FlowControl,
    #[strum(to_string = "modem control")]
    ModemControl,
    #[strum(to_string = "prescaler")]
    Prescaler,
    #[strum(to_string = "divisor")]
    Divisor,
}

fn during(step: ConfigStep) -> impl FnOnce(TransportError) -> ConfigError {
    move |source| ConfigError::Step { step, source }
}

/// Brings the chip from an unknown state to `line` at `baud_rate`. Each write relies on the
/// state left by the previous one, so the first failure stops the sequence.
pub fn configure<T: Ch34xCommands + ?Sized>(
    device: &mut T,
    baud_rate: u32,
    line: LineControl,
) -> Result<BaudRegisters, ConfigError> {
    // Nothing gets written if the rate can't be programmed.
    let registers = calculate_baud_registers(baud_rate)?;

    let version = device
        .read_chip_version(VERSION_INTERFACE)
        .map_err(during(ConfigStep::ReadVersion))?;
    info!("Chip version: {}", version);

    device
        .serial_init()
        .map_err(during(ConfigStep::SerialInit))?;

    device
        .write_register(INIT_REGISTER_VALUE, INIT_REGISTER_INDEX)
        .map_err(during(ConfigStep::InitRegister))?;

    let lcr = Register::pair(Register::LineControl2, Register::LineControl);
    device
        .write_register(lcr, line.bits() as u16)
        .map_err(during(ConfigStep::LineControl))?;

    let flow = Register::pair(Register::FlowControl, Register::FlowControl);
    device
        .write_register(flow, FlowControl::None.id())
        .map_err(during(ConfigStep::FlowControl))?;

    device
        .set_modem_control(MODEM_OUT_ASSERT)
        .map_err(during(ConfigStep::ModemControl))?;

    debug!(
        "Baud {} -> prescaler {}, divisor {} (actual {:.0}, error {:.2}%)",
        baud_rate,
        registers.prescaler,
        registers.divisor,
        registers.actual_baud_rate,
        registers.error_percent()
    );
    device
        .write_register(Register::Prescaler.address() as u16, registers.prescaler as u16)
        .map_err(during(ConfigStep::Prescaler))?;
    device
        .write_register(Register::Divisor.address() as u16, registers.divisor as u16)
        .map_err(during(ConfigStep::Divisor))?;

    Ok(registers)
}
