use std::fmt;

use thiserror::Error;

use crate::host::Buttons;

/// Game Boy LCD width.
pub const LCD_WIDTH: usize = 160;
/// Game Boy LCD height.
pub const LCD_HEIGHT: usize = 144;

/// One byte per pixel; the shade lives in the low two bits.
pub type Framebuffer = [[u8; LCD_WIDTH]; LCD_HEIGHT];

/// Joypad lines as the core sees them: `true` means released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JoypadBits {
    pub a: bool,
    pub b: bool,
    pub select: bool,
    pub start: bool,
    pub right: bool,
    pub left: bool,
    pub up: bool,
    pub down: bool,
}

impl JoypadBits {
    pub const RELEASED: Self = Self {
        a: true,
        b: true,
        select: true,
        start: true,
        right: true,
        left: true,
        up: true,
        down: true,
    };

    /// Maps device buttons plus the crank soft buttons onto active-low lines.
    pub fn from_input(buttons: Buttons, start_pressed: bool, select_pressed: bool) -> Self {
        Self {
            a: !buttons.contains(Buttons::A),
            b: !buttons.contains(Buttons::B),
            select: !select_pressed,
            start: !start_pressed,
            right: !buttons.contains(Buttons::RIGHT),
            left: !buttons.contains(Buttons::LEFT),
            up: !buttons.contains(Buttons::UP),
            down: !buttons.contains(Buttons::DOWN),
        }
    }
}

impl Default for JoypadBits {
    fn default() -> Self {
        Self::RELEASED
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoreErrorKind {
    InvalidOpcode,
    InvalidRead,
    InvalidWrite,
    Unknown,
}

impl fmt::Display for CoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidOpcode => "invalid opcode",
            Self::InvalidRead => "invalid read",
            Self::InvalidWrite => "invalid write",
            Self::Unknown => "unknown error",
        };
        f.write_str(name)
    }
}

/// Fault raised by the core while running a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{kind} {value:#06x} at PC: {pc:#06x}, SP: {sp:#06x}")]
pub struct CoreError {
    pub kind: CoreErrorKind,
    /// Opcode or address involved, depending on `kind`.
    pub value: u16,
    pub pc: u16,
    pub sp: u16,
}

impl CoreError {
    /// Invalid memory accesses are survivable; everything else stops the game.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self.kind,
            CoreErrorKind::InvalidRead | CoreErrorKind::InvalidWrite
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("unsupported cartridge type {0:#04x}")]
    CartridgeUnsupported(u8),
    #[error("{0}")]
    Other(String),
}

/// Cartridge memory lent to the core for one frame.
pub struct CartridgeMemory<'a> {
    pub rom: &'a [u8],
    pub ram: &'a mut [u8],
}

pub trait Emulator {
    /// Cartridge RAM size in bytes for the loaded ROM; 0 when none.
    fn save_size(&self) -> usize;

    fn set_joypad(&mut self, joypad: JoypadBits);

    /// Runs exactly one emulated video frame.
    fn run_frame(&mut self, memory: CartridgeMemory<'_>) -> Result<(), CoreError>;

    /// Advances the cartridge RTC by one second.
    fn tick_rtc(&mut self);

    fn framebuffer(&self) -> &Framebuffer;

    /// `true` when frame skipping is on and the last frame was not rendered.
    fn frame_skipped(&self) -> bool;

    fn set_frame_skip(&mut self, enabled: bool);

    fn set_audio_enabled(&mut self, _enabled: bool) {}
}

pub trait EmulatorFactory {
    type Core: Emulator;

    /// Validates the ROM header and builds a core ready to run.
    fn create(&mut self, rom: &[u8]) -> Result<Self::Core, InitError>;
}
