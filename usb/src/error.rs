use crate::configure::ConfigStep;

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    #[error("Short read from CH34x, expected {expected} bytes, received {actual}")]
    ShortRead { expected: usize, actual: usize },
}

#[derive(thiserror::Error, Debug)]
pub enum ConnectError {
    #[error("No supported CH34x device was found")]
    DeviceNotFound,

    #[error("No bulk OUT endpoint found on the device")]
    EndpointNotFound,

    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaudError {
    #[error("No prescaler / divisor combination can approximate {target} baud")]
    Unsolvable { target: u32 },
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Configuration step '{step}' failed: {source}")]
    Step {
        step: ConfigStep,
        #[source]
        source: TransportError,
    },

    #[error(transparent)]
    Baud(#[from] BaudError),
}

impl ConfigError {
    /// The step which failed, if the failure came from the device.
    pub fn step(&self) -> Option<ConfigStep> {
        match self {
            ConfigError::Step { step, .. } => Some(*step),
            ConfigError::Baud(_) => None,
        }
    }
}
