use crate::commands::{
    LCR_CS5, LCR_CS6, LCR_CS7, LCR_CS8, LCR_ENABLE_PAR, LCR_ENABLE_RX, LCR_ENABLE_TX,
    LCR_MARK_SPACE, LCR_PAR_EVEN, LCR_STOP_BITS_2,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CharacterSize {
    Five,
    Six,
    Seven,
    #[default]
    Eight,
}

impl CharacterSize {
    pub fn id(&self) -> u8 {
        match self {
            CharacterSize::Five => LCR_CS5,
            CharacterSize::Six => LCR_CS6,
            CharacterSize::Seven => LCR_CS7,
            CharacterSize::Eight => LCR_CS8,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
    Mark,
    Space,
}

impl Parity {
    pub fn id(&self) -> u8 {
        match self {
            Parity::None => 0x00,
            Parity::Odd => LCR_ENABLE_PAR,
            Parity::Even => LCR_ENABLE_PAR | LCR_PAR_EVEN,
            Parity::Mark => LCR_ENABLE_PAR | LCR_MARK_SPACE,
            Parity::Space => LCR_ENABLE_PAR | LCR_MARK_SPACE | LCR_PAR_EVEN,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StopBits {
    #[default]
    One,
    Two,
}

impl StopBits {
    pub fn id(&self) -> u8 {
        match self {
            StopBits::One => 0x00,
            StopBits::Two => LCR_STOP_BITS_2,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineControl {
    pub enable_rx: bool,
    pub enable_tx: bool,
    pub character_size: CharacterSize,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl Default for LineControl {
    // 8N1 with both directions enabled
    fn default() -> Self {
        Self {
            enable_rx: true,
            enable_tx: true,
            character_size: CharacterSize::default(),
            parity: Parity::default(),
            stop_bits: StopBits::default(),
        }
    }
}

impl LineControl {
    pub fn bits(&self) -> u8 {
        let mut lcr = self.character_size.id() | self.parity.id() | self.stop_bits.id();
        if self.enable_rx {
            lcr |= LCR_ENABLE_RX;
        }
        if self.enable_tx {
            lcr |= LCR_ENABLE_TX;
        }
        lcr
    }
}
