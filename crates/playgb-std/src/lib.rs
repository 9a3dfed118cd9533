//! Headless host over the standard library.
//!
//! Files live under a data directory on the local file system, the display
//! is an in-memory 1-bit frame buffer and input is fed in by the embedder
//! (a desktop front-end, a test harness or a replay tool). Drawing commands
//! that need device fonts or images are recorded in a draw log instead of
//! being rasterized.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use log::debug;

use playgb_core::error::{FsError, WRONG_LOCATION_CODE};
use playgb_core::host::{
    ButtonState, Buttons, Clock, Color, CrankState, DrawMode, FileStat, FileSystem, Font,
    Graphics, HardwareRevision, Host, Input, LCD_COLUMNS, LCD_ROWS, LCD_ROWSIZE, Lcd, Menu,
    MenuEvent, MenuItem, MenuItemKind, Rect, SelectorFrame,
};

/// Recorded drawing command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawEvent {
    Text {
        font: Font,
        text: String,
        x: i32,
        y: i32,
        mode: DrawMode,
    },
    Selector {
        frame: SelectorFrame,
        x: i32,
        y: i32,
    },
    Image {
        path: String,
        rect: Rect,
    },
    Fps {
        x: i32,
        y: i32,
    },
}

#[derive(Debug)]
pub struct StdHost {
    root: PathBuf,
    revision: HardwareRevision,

    frame: Vec<u8>,
    updated_rows: Vec<bool>,
    draw_log: Vec<DrawEvent>,

    held: Buttons,
    buttons: ButtonState,
    crank_angle: Option<f32>,
    crank: CrankState,

    tick_start: Instant,

    menu: Vec<MenuItem>,
    menu_events: VecDeque<MenuEvent>,
}

impl StdHost {
    /// Creates a host whose data directory is `root`. The directory itself
    /// is created lazily by the first write or `mkdir`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            revision: HardwareRevision::Unknown,
            frame: vec![0xFF; LCD_ROWS * LCD_ROWSIZE],
            updated_rows: vec![false; LCD_ROWS],
            draw_log: Vec::new(),
            held: Buttons::empty(),
            buttons: ButtonState::default(),
            crank_angle: None,
            crank: CrankState::default(),
            tick_start: Instant::now(),
            menu: Vec::new(),
            menu_events: VecDeque::new(),
        }
    }

    pub fn with_revision(mut self, revision: HardwareRevision) -> Self {
        self.revision = revision;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Buttons held from the next tick on.
    pub fn set_buttons(&mut self, held: Buttons) {
        self.held = held;
    }

    /// Undocks the crank (if needed) and points it at `angle` degrees.
    pub fn set_crank_angle(&mut self, angle: f32) {
        self.crank_angle = Some(angle.rem_euclid(360.0));
    }

    pub fn dock_crank(&mut self) {
        self.crank_angle = None;
    }

    /// Starts a new host frame: latches input edges and the crank delta and
    /// restarts the elapsed-time clock. Call once before each `App::tick`.
    pub fn begin_tick(&mut self) {
        let previous = self.buttons.current;
        self.buttons = ButtonState {
            current: self.held,
            pushed: self.held - previous,
            released: previous - self.held,
        };

        self.crank = match (self.crank_angle, self.crank.docked) {
            (None, _) => CrankState::default(),
            (Some(angle), true) => CrankState {
                docked: false,
                angle,
                change: 0.0,
            },
            (Some(angle), false) => CrankState {
                docked: false,
                angle,
                change: wrap_degrees(angle - self.crank.angle),
            },
        };

        self.updated_rows.fill(false);
        self.tick_start = Instant::now();
    }

    /// Activates a menu item by title the way the system menu would. Returns
    /// `false` when no such item is installed.
    pub fn activate_menu_item(&mut self, title: &str) -> bool {
        let Some(item) = self.menu.iter_mut().find(|item| item.title == title) else {
            return false;
        };
        let event = match item.kind {
            MenuItemKind::Action => MenuEvent::Selected(item.action),
            MenuItemKind::Checkmark(value) => {
                item.kind = MenuItemKind::Checkmark(!value);
                MenuEvent::Toggled(item.action, !value)
            }
        };
        self.menu_events.push_back(event);
        true
    }

    pub fn menu_items(&self) -> &[MenuItem] {
        &self.menu
    }

    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Whether the pixel at `(x, y)` is white.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.frame
            .get(y * LCD_ROWSIZE + x / 8)
            .is_some_and(|byte| byte & (0x80 >> (x % 8)) != 0)
    }

    /// Rows flagged for flushing since the last `begin_tick`.
    pub fn updated_rows(&self) -> Vec<usize> {
        self.updated_rows
            .iter()
            .enumerate()
            .filter_map(|(row, &updated)| updated.then_some(row))
            .collect()
    }

    pub fn draw_log(&self) -> &[DrawEvent] {
        &self.draw_log
    }

    pub fn take_draw_log(&mut self) -> Vec<DrawEvent> {
        std::mem::take(&mut self.draw_log)
    }

    /// Maps a data-directory path onto the local file system. Absolute paths
    /// and paths escaping the root are refused with the wrong-location code.
    fn resolve(&self, path: &str) -> Result<PathBuf, FsError> {
        let relative = Path::new(path);
        let inside = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !inside {
            return Err(FsError::with_code(
                WRONG_LOCATION_CODE,
                format!("{path} is outside the data directory"),
            ));
        }
        Ok(self.root.join(relative))
    }

    fn paint_rows(&mut self, rows: Range<usize>, columns: Range<usize>, color: Color) {
        for row in rows {
            let line = &mut self.frame[row * LCD_ROWSIZE..(row + 1) * LCD_ROWSIZE];
            for x in columns.clone() {
                let bit = 0x80 >> (x % 8);
                match color {
                    Color::White => line[x / 8] |= bit,
                    Color::Black => line[x / 8] &= !bit,
                }
            }
            self.updated_rows[row] = true;
        }
    }
}

fn wrap_degrees(delta: f32) -> f32 {
    (delta + 180.0).rem_euclid(360.0) - 180.0
}

fn fs_error(path: &str, err: io::Error) -> FsError {
    let message = format!("{path}: {err}");
    match err.raw_os_error() {
        Some(code) => FsError::with_code(format!("{code:04}"), message),
        None => FsError::new(message),
    }
}

fn clamp_span(start: i32, len: i32, max: usize) -> Range<usize> {
    let end = start.saturating_add(len.max(0)).clamp(0, max as i32) as usize;
    let start = start.clamp(0, max as i32) as usize;
    start..end.max(start)
}

impl FileSystem for StdHost {
    fn stat(&mut self, path: &str) -> Result<FileStat, FsError> {
        let local = self.resolve(path)?;
        let meta = fs::metadata(&local).map_err(|e| fs_error(path, e))?;
        Ok(FileStat {
            size: meta.len() as usize,
        })
    }

    fn read(&mut self, path: &str) -> Result<Vec<u8>, FsError> {
        let local = self.resolve(path)?;
        fs::read(&local).map_err(|e| fs_error(path, e))
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), FsError> {
        let local = self.resolve(path)?;
        fs::write(&local, data).map_err(|e| fs_error(path, e))
    }

    fn mkdir(&mut self, path: &str) -> Result<(), FsError> {
        let local = self.resolve(path)?;
        fs::create_dir_all(&local).map_err(|e| fs_error(path, e))
    }

    fn list_files(&mut self, dir: &str) -> Result<Vec<String>, FsError> {
        let local = self.resolve(dir)?;
        let entries = fs::read_dir(&local).map_err(|e| fs_error(dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| fs_error(dir, e))?;
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => debug!("Skipping non UTF-8 file name {name:?} in {dir}"),
            }
        }
        Ok(names)
    }
}

impl Input for StdHost {
    fn buttons(&self) -> ButtonState {
        self.buttons
    }

    fn crank(&self) -> CrankState {
        self.crank
    }
}

impl Clock for StdHost {
    fn elapsed(&self) -> Duration {
        self.tick_start.elapsed()
    }

    fn epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }

    fn sleep(&mut self, duration: Duration) {
        spin_sleep::sleep(duration);
    }
}

impl Graphics for StdHost {
    fn clear(&mut self, color: Color) {
        self.paint_rows(0..LCD_ROWS, 0..LCD_COLUMNS, color);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let rows = clamp_span(rect.y, rect.height, LCD_ROWS);
        let columns = clamp_span(rect.x, rect.width, LCD_COLUMNS);
        if columns.is_empty() {
            return;
        }
        self.paint_rows(rows, columns, color);
    }

    fn draw_text(&mut self, font: Font, text: &str, x: i32, y: i32, mode: DrawMode) {
        self.draw_log.push(DrawEvent::Text {
            font,
            text: text.to_string(),
            x,
            y,
            mode,
        });
    }

    /// Fixed-advance metrics standing in for the device fonts.
    fn text_width(&self, font: Font, text: &str) -> i32 {
        let advance = match font {
            Font::Title => 12,
            Font::Subhead => 9,
            Font::Body => 7,
            Font::Label => 6,
        };
        text.chars().count() as i32 * advance
    }

    fn font_height(&self, font: Font) -> i32 {
        match font {
            Font::Title => 24,
            Font::Subhead => 18,
            Font::Body => 14,
            Font::Label => 10,
        }
    }

    fn draw_selector(&mut self, frame: SelectorFrame, x: i32, y: i32) {
        self.draw_log.push(DrawEvent::Selector { frame, x, y });
    }

    fn draw_image(&mut self, path: &str, rect: Rect) -> bool {
        let exists = self.resolve(path).is_ok_and(|local| local.is_file());
        if exists {
            self.draw_log.push(DrawEvent::Image {
                path: path.to_string(),
                rect,
            });
        }
        exists
    }

    fn draw_fps(&mut self, x: i32, y: i32) {
        self.draw_log.push(DrawEvent::Fps { x, y });
    }
}

impl Lcd for StdHost {
    fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.frame
    }

    fn mark_updated_rows(&mut self, start: usize, end: usize) {
        let end = end.min(LCD_ROWS - 1);
        if start <= end {
            self.updated_rows[start..=end].fill(true);
        }
    }
}

impl Menu for StdHost {
    fn remove_all_menu_items(&mut self) {
        self.menu.clear();
    }

    fn add_menu_item(&mut self, item: MenuItem) {
        self.menu.push(item);
    }

    fn poll_menu_event(&mut self) -> Option<MenuEvent> {
        self.menu_events.pop_front()
    }
}

impl Host for StdHost {
    fn hardware_revision(&self) -> HardwareRevision {
        self.revision
    }
}
