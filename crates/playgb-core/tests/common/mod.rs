#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::time::Duration;

use playgb_core::emulator::{
    CartridgeMemory, CoreError, CoreErrorKind, Emulator, EmulatorFactory, Framebuffer, InitError,
    JoypadBits, LCD_HEIGHT, LCD_WIDTH,
};
use playgb_core::error::FsError;
use playgb_core::host::{
    ButtonState, Buttons, Clock, Color, CrankState, DrawMode, FileStat, FileSystem, Font,
    Graphics, HardwareRevision, Host, Input, LCD_ROWS, LCD_ROWSIZE, Lcd, Menu, MenuEvent, MenuItem,
    Rect, SelectorFrame,
};

/// In-memory device used by the integration tests.
pub struct MockHost {
    pub files: BTreeMap<String, Vec<u8>>,
    pub dirs: BTreeSet<String>,
    /// Errors returned by `stat` and `read` for a path.
    pub fs_errors: HashMap<String, FsError>,
    /// Sizes reported by `stat` instead of the real length.
    pub stat_sizes: HashMap<String, usize>,
    pub write_error: Option<FsError>,
    pub writes: Vec<String>,

    pub buttons: ButtonState,
    pub crank: CrankState,

    pub elapsed: Duration,
    pub epoch: u64,
    pub sleeps: Vec<Duration>,

    pub frame: Vec<u8>,
    pub updated_rows: Vec<(usize, usize)>,
    pub clears: Vec<Color>,
    pub texts: Vec<(String, DrawMode)>,
    pub images: Vec<(String, Rect)>,
    pub selector_frames: Vec<SelectorFrame>,
    pub fps_draws: usize,

    pub menu: Vec<MenuItem>,
    pub menu_events: VecDeque<MenuEvent>,

    pub revision: HardwareRevision,
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            files: BTreeMap::new(),
            dirs: BTreeSet::new(),
            fs_errors: HashMap::new(),
            stat_sizes: HashMap::new(),
            write_error: None,
            writes: Vec::new(),
            buttons: ButtonState::default(),
            crank: CrankState::default(),
            elapsed: Duration::ZERO,
            epoch: 1_700_000_000,
            sleeps: Vec::new(),
            frame: vec![0; LCD_ROWS * LCD_ROWSIZE],
            updated_rows: Vec::new(),
            clears: Vec::new(),
            texts: Vec::new(),
            images: Vec::new(),
            selector_frames: Vec::new(),
            fps_draws: 0,
            menu: Vec::new(),
            menu_events: VecDeque::new(),
            revision: HardwareRevision::Unknown,
        }
    }
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, data);
        self
    }

    pub fn add_file(&mut self, path: &str, data: impl Into<Vec<u8>>) {
        if let Some((dir, _)) = path.rsplit_once('/') {
            self.dirs.insert(dir.to_string());
        }
        self.files.insert(path.to_string(), data.into());
    }

    pub fn file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn press(&mut self, buttons: Buttons) {
        self.buttons = ButtonState {
            current: buttons,
            pushed: buttons,
            released: Buttons::empty(),
        };
    }

    pub fn release(&mut self, buttons: Buttons) {
        self.buttons = ButtonState {
            current: Buttons::empty(),
            pushed: Buttons::empty(),
            released: buttons,
        };
    }

    pub fn idle(&mut self) {
        self.buttons = ButtonState::default();
    }

    pub fn text_drawn(&self, text: &str) -> bool {
        self.texts.iter().any(|(t, _)| t == text)
    }

    pub fn menu_titles(&self) -> Vec<&'static str> {
        self.menu.iter().map(|item| item.title).collect()
    }

    pub fn clear_log(&mut self) {
        self.updated_rows.clear();
        self.clears.clear();
        self.texts.clear();
        self.images.clear();
        self.selector_frames.clear();
        self.fps_draws = 0;
        self.sleeps.clear();
        self.writes.clear();
    }

    pub fn marked_rows(&self) -> usize {
        self.updated_rows.iter().map(|(s, e)| e - s + 1).sum()
    }
}

impl FileSystem for MockHost {
    fn stat(&mut self, path: &str) -> Result<FileStat, FsError> {
        if let Some(err) = self.fs_errors.get(path) {
            return Err(err.clone());
        }
        if let Some(&size) = self.stat_sizes.get(path) {
            return Ok(FileStat { size });
        }
        match self.files.get(path) {
            Some(data) => Ok(FileStat { size: data.len() }),
            None if self.dirs.contains(path) => Ok(FileStat { size: 0 }),
            None => Err(FsError::new(format!("{path}: no such file"))),
        }
    }

    fn read(&mut self, path: &str) -> Result<Vec<u8>, FsError> {
        if let Some(err) = self.fs_errors.get(path) {
            return Err(err.clone());
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FsError::new(format!("{path}: no such file")))
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), FsError> {
        if let Some(err) = &self.write_error {
            return Err(err.clone());
        }
        self.writes.push(path.to_string());
        self.add_file(path, data);
        Ok(())
    }

    fn mkdir(&mut self, path: &str) -> Result<(), FsError> {
        self.dirs.insert(path.to_string());
        Ok(())
    }

    fn list_files(&mut self, dir: &str) -> Result<Vec<String>, FsError> {
        if !self.dirs.contains(dir) {
            return Err(FsError::new(format!("{dir}: no such directory")));
        }
        let prefix = format!("{dir}/");
        Ok(self
            .files
            .keys()
            .filter_map(|path| path.strip_prefix(&prefix))
            .filter(|name| !name.contains('/'))
            .map(str::to_string)
            .collect())
    }
}

impl Input for MockHost {
    fn buttons(&self) -> ButtonState {
        self.buttons
    }

    fn crank(&self) -> CrankState {
        self.crank
    }
}

impl Clock for MockHost {
    fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn epoch_seconds(&self) -> u64 {
        self.epoch
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}

impl Graphics for MockHost {
    fn clear(&mut self, color: Color) {
        self.clears.push(color);
    }

    fn fill_rect(&mut self, _rect: Rect, _color: Color) {}

    fn draw_text(&mut self, _font: Font, text: &str, _x: i32, _y: i32, mode: DrawMode) {
        self.texts.push((text.to_string(), mode));
    }

    fn text_width(&self, _font: Font, text: &str) -> i32 {
        text.chars().count() as i32 * 7
    }

    fn font_height(&self, font: Font) -> i32 {
        match font {
            Font::Title => 24,
            Font::Subhead => 16,
            Font::Body | Font::Label => 12,
        }
    }

    fn draw_selector(&mut self, frame: SelectorFrame, _x: i32, _y: i32) {
        self.selector_frames.push(frame);
    }

    fn draw_image(&mut self, path: &str, rect: Rect) -> bool {
        self.images.push((path.to_string(), rect));
        self.files.contains_key(path)
    }

    fn draw_fps(&mut self, _x: i32, _y: i32) {
        self.fps_draws += 1;
    }
}

impl Lcd for MockHost {
    fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.frame
    }

    fn mark_updated_rows(&mut self, start: usize, end: usize) {
        self.updated_rows.push((start, end));
    }
}

impl Menu for MockHost {
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

impl Host for MockHost {
    fn hardware_revision(&self) -> HardwareRevision {
        self.revision
    }
}

/// Emulation core that replays a script instead of executing the ROM.
///
/// Every frame it stamps the frame number into the first byte of cartridge
/// RAM and into the top-left pixel, so both visibly change over time.
pub struct ScriptedCore {
    pub save_size: usize,
    pub frame: Box<Framebuffer>,
    pub frames_run: usize,
    pub rtc_ticks: u64,
    pub joypad: JoypadBits,
    /// `(frame index, error)` pairs returned by `run_frame`.
    pub errors: VecDeque<(usize, CoreError)>,
    pub skip_frames: bool,
    pub animate: bool,
    pub audio_enabled: bool,
    pub frame_skip: bool,
}

impl Emulator for ScriptedCore {
    fn save_size(&self) -> usize {
        self.save_size
    }

    fn set_joypad(&mut self, joypad: JoypadBits) {
        self.joypad = joypad;
    }

    fn run_frame(&mut self, memory: CartridgeMemory<'_>) -> Result<(), CoreError> {
        let index = self.frames_run;
        self.frames_run += 1;

        if let Some(first) = memory.ram.first_mut() {
            *first = self.frames_run as u8;
        }
        if self.animate {
            self.frame[0][0] = (self.frames_run % 4) as u8;
        }

        match self.errors.front() {
            Some(&(at, err)) if at == index => {
                self.errors.pop_front();
                Err(err)
            }
            _ => Ok(()),
        }
    }

    fn tick_rtc(&mut self) {
        self.rtc_ticks += 1;
    }

    fn framebuffer(&self) -> &Framebuffer {
        &self.frame
    }

    fn frame_skipped(&self) -> bool {
        self.skip_frames
    }

    fn set_frame_skip(&mut self, enabled: bool) {
        self.frame_skip = enabled;
    }

    fn set_audio_enabled(&mut self, enabled: bool) {
        self.audio_enabled = enabled;
    }
}

#[derive(Default)]
pub struct ScriptedFactory {
    pub save_size: usize,
    pub init_error: Option<InitError>,
    pub errors: Vec<(usize, CoreError)>,
    pub skip_frames: bool,
    pub animate: bool,
    pub created: usize,
}

impl ScriptedFactory {
    pub fn with_save_size(save_size: usize) -> Self {
        Self {
            save_size,
            ..Self::default()
        }
    }
}

impl EmulatorFactory for ScriptedFactory {
    type Core = ScriptedCore;

    fn create(&mut self, rom: &[u8]) -> Result<ScriptedCore, InitError> {
        if let Some(err) = &self.init_error {
            return Err(err.clone());
        }
        if rom.is_empty() {
            return Err(InitError::Other("empty ROM".to_string()));
        }
        self.created += 1;
        Ok(ScriptedCore {
            save_size: self.save_size,
            frame: Box::new([[0; LCD_WIDTH]; LCD_HEIGHT]),
            frames_run: 0,
            rtc_ticks: 0,
            joypad: JoypadBits::RELEASED,
            errors: self.errors.iter().copied().collect(),
            skip_frames: self.skip_frames,
            animate: self.animate,
            audio_enabled: false,
            frame_skip: false,
        })
    }
}

pub fn core_error(kind: CoreErrorKind) -> CoreError {
    CoreError {
        kind,
        value: 0xd3,
        pc: 0x0150,
        sp: 0xfffe,
    }
}

/// A 32 KiB ROM image; the content is irrelevant to the scripted core.
pub fn rom() -> Vec<u8> {
    vec![0x00; 0x8000]
}
