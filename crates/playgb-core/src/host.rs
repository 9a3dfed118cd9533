use std::time::Duration;

use bitflags::bitflags;

use crate::error::FsError;

/// Display width in pixels.
pub const LCD_COLUMNS: usize = 400;
/// Display height in pixels.
pub const LCD_ROWS: usize = 240;
/// Bytes per packed 1-bit display row (400 pixels plus padding).
pub const LCD_ROWSIZE: usize = 52;

bitflags! {
    /// Device buttons, using the device's own bit assignment.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        const LEFT = 0x01;
        const RIGHT = 0x02;
        const UP = 0x04;
        const DOWN = 0x08;
        const B = 0x10;
        const A = 0x20;
    }
}

/// Button snapshot for the current tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Buttons held down right now.
    pub current: Buttons,
    /// Buttons that went down since the previous tick.
    pub pushed: Buttons,
    /// Buttons that came up since the previous tick.
    pub released: Buttons,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrankState {
    pub docked: bool,
    /// Absolute angle in degrees, 0 pointing up, increasing clockwise.
    pub angle: f32,
    /// Signed angle change since the previous tick.
    pub change: f32,
}

impl Default for CrankState {
    fn default() -> Self {
        Self {
            docked: true,
            angle: 0.0,
            change: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HardwareRevision {
    #[default]
    Unknown,
    RevA,
    RevB,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileStat {
    pub size: usize,
}

pub trait FileSystem {
    fn stat(&mut self, path: &str) -> Result<FileStat, FsError>;
    /// Reads the whole file.
    fn read(&mut self, path: &str) -> Result<Vec<u8>, FsError>;
    /// Replaces the whole file.
    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), FsError>;
    /// Creates a directory; an existing directory is not an error.
    fn mkdir(&mut self, path: &str) -> Result<(), FsError>;
    /// File names (not paths) directly inside `dir`, in no particular order.
    fn list_files(&mut self, dir: &str) -> Result<Vec<String>, FsError>;

    fn exists(&mut self, path: &str) -> bool {
        self.stat(path).is_ok()
    }
}

pub trait Input {
    fn buttons(&self) -> ButtonState;
    fn crank(&self) -> CrankState;
}

pub trait Clock {
    /// Time since the host began the current tick.
    fn elapsed(&self) -> Duration;
    /// Wall-clock seconds since the Unix epoch.
    fn epoch_seconds(&self) -> u64;
    /// Blocks for roughly `duration`; used for frame pacing only.
    fn sleep(&mut self, duration: Duration);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    Copy,
    FillWhite,
    FillBlack,
}

/// Fonts the host preloads; the shell only refers to them by role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Font {
    Body,
    Title,
    Subhead,
    Label,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Overlap of two rects; empty rects have zero width or height.
    pub fn intersect(&self, other: Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect::new(x, y, (right - x).max(0), (bottom - y).max(0))
    }
}

/// Frame of the crank indicator bitmap table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorFrame {
    /// Position within the indicator table, `0..SELECTOR_FRAMES`.
    Position(u8),
    /// Both soft buttons held (crank inside the dead band).
    StartSelect,
}

pub trait Graphics {
    fn display_size(&self) -> (i32, i32) {
        (LCD_COLUMNS as i32, LCD_ROWS as i32)
    }
    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn draw_text(&mut self, font: Font, text: &str, x: i32, y: i32, mode: DrawMode);
    fn text_width(&self, font: Font, text: &str) -> i32;
    fn font_height(&self, font: Font) -> i32;
    fn draw_selector(&mut self, frame: SelectorFrame, x: i32, y: i32);
    /// Draws an image file scaled into `rect`. Returns `false` when the
    /// image could not be loaded.
    fn draw_image(&mut self, path: &str, rect: Rect) -> bool;
    fn draw_fps(&mut self, x: i32, y: i32);
}

/// Direct access to the packed 1-bit frame buffer.
pub trait Lcd {
    /// `LCD_ROWS` rows of `LCD_ROWSIZE` bytes, MSB first, set bit = white.
    fn frame_mut(&mut self) -> &mut [u8];
    /// Flags rows `start..=end` for the next display flush.
    fn mark_updated_rows(&mut self, start: usize, end: usize);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MenuAction {
    Library,
    Save,
    Refresh,
    Sound,
    ShowFps,
    FrameSkip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuItemKind {
    Action,
    Checkmark(bool),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub title: &'static str,
    pub action: MenuAction,
    pub kind: MenuItemKind,
}

impl MenuItem {
    pub const fn action(title: &'static str, action: MenuAction) -> Self {
        Self {
            title,
            action,
            kind: MenuItemKind::Action,
        }
    }

    pub const fn checkmark(title: &'static str, action: MenuAction, value: bool) -> Self {
        Self {
            title,
            action,
            kind: MenuItemKind::Checkmark(value),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuEvent {
    Selected(MenuAction),
    Toggled(MenuAction, bool),
}

/// System menu. Item activation is queued by the host and drained by the
/// app at the start of each tick.
pub trait Menu {
    fn remove_all_menu_items(&mut self);
    fn add_menu_item(&mut self, item: MenuItem);
    fn poll_menu_event(&mut self) -> Option<MenuEvent>;
}

pub trait Host: FileSystem + Input + Clock + Graphics + Lcd + Menu {
    fn hardware_revision(&self) -> HardwareRevision {
        HardwareRevision::Unknown
    }
}
