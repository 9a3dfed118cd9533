use log::{error, info, warn};

use super::{Navigation, Pacing, SceneContext, SceneUpdate, draw_message};
use crate::config::ShellConfig;
use crate::crank::CrankSelector;
use crate::display::DisplayConverter;
use crate::emulator::{CartridgeMemory, Emulator, EmulatorFactory, JoypadBits};
use crate::error::FsError;
use crate::host::{Color, DrawMode, Font, Host, MenuAction, MenuEvent, MenuItem, SelectorFrame};
use crate::persistence::{Preferences, read_cart_ram, save_path, write_cart_ram};
use crate::rtc::RtcCatchUp;

const START_LABEL: &str = "start";
const SELECT_LABEL: &str = "select";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Loaded,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameError {
    Undefined,
    LoadingRom,
    WrongLocation,
    Fatal,
}

impl GameError {
    fn from_fs(err: &FsError) -> Self {
        if err.is_wrong_location() {
            Self::WrongLocation
        } else {
            Self::LoadingRom
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::WrongLocation => "Wrong location",
            _ => "Oh no!",
        }
    }

    pub fn messages(&self) -> &'static [&'static str] {
        match self {
            Self::Undefined => &["A generic error occurred"],
            Self::LoadingRom => &["Can't load the selected ROM"],
            Self::WrongLocation => &["Please move the ROM to", "/Data/*.playgb/games/"],
            Self::Fatal => &["A fatal error occurred"],
        }
    }
}

/// Placement of the crank indicator and its labels, right of the game area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectorLayout {
    pub x: i32,
    pub y: i32,
    pub start_label_x: i32,
    pub start_label_y: i32,
    pub select_label_x: i32,
    pub select_label_y: i32,
}

impl SelectorLayout {
    const WIDTH: i32 = 18;
    const HEIGHT: i32 = 46;
    const START_SPACING: i32 = 3;
    const SELECT_SPACING: i32 = 6;
    const MARGIN_RIGHT: i32 = 6;
    const MARGIN_TOP: i32 = 8;

    pub fn measure<H: Host + ?Sized>(host: &H) -> Self {
        let start_width = host.text_width(Font::Label, START_LABEL);
        let select_width = host.text_width(Font::Label, SELECT_LABEL);
        let label_height = host.font_height(Font::Label);

        let container_width = Self::WIDTH.max(start_width).max(select_width);
        let container_height = label_height
            + Self::START_SPACING
            + Self::HEIGHT
            + Self::SELECT_SPACING
            + label_height;
        let container_x = host.display_size().0 - Self::MARGIN_RIGHT - container_width;
        let container_y = Self::MARGIN_TOP;

        Self {
            x: container_x + (container_width - Self::WIDTH) / 2,
            y: container_y + label_height + Self::START_SPACING,
            start_label_x: container_x + (container_width - start_width) / 2,
            start_label_y: container_y,
            select_label_x: container_x + (container_width - select_width) / 2,
            select_label_y: container_y + container_height - label_height,
        }
    }
}

/// What the last update put on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct GameModel {
    state: GameState,
    error: GameError,
    selector: SelectorFrame,
}

pub struct GameScene<C: Emulator> {
    rom_path: String,
    save_path: String,
    recovery_path: String,
    rom: Vec<u8>,
    cart_ram: Vec<u8>,
    core: Option<C>,
    state: GameState,
    error: GameError,
    model: Option<GameModel>,
    needs_display: bool,
    selector: CrankSelector,
    layout: SelectorLayout,
    rtc: RtcCatchUp,
    converter: DisplayConverter,
}

impl<C: Emulator> GameScene<C> {
    pub fn new<H, F>(
        host: &mut H,
        factory: &mut F,
        rom_path: &str,
        config: &ShellConfig,
        preferences: &Preferences,
    ) -> Self
    where
        H: Host + ?Sized,
        F: EmulatorFactory<Core = C>,
    {
        let mut scene = Self {
            rom_path: rom_path.to_string(),
            save_path: save_path(&config.saves_dir, rom_path, false),
            recovery_path: save_path(&config.saves_dir, rom_path, true),
            rom: Vec::new(),
            cart_ram: Vec::new(),
            core: None,
            state: GameState::Error,
            error: GameError::Undefined,
            model: None,
            needs_display: false,
            selector: CrankSelector::new(config.crank),
            layout: SelectorLayout::measure(host),
            rtc: RtcCatchUp::new(host.epoch_seconds(), config.rtc.max_catch_up_secs),
            converter: DisplayConverter::new(config.lcd.x, config.lcd.y),
        };

        scene.rom = match read_rom(host, rom_path) {
            Ok(rom) => rom,
            Err(err) => {
                scene.error = err;
                return scene;
            }
        };

        let mut core = match factory.create(&scene.rom) {
            Ok(core) => core,
            Err(e) => {
                error!("Error initializing core for {rom_path}: {e}");
                scene.error = GameError::Fatal;
                return scene;
            }
        };

        scene.cart_ram = read_cart_ram(host, &scene.save_path, core.save_size());
        core.set_audio_enabled(preferences.sound_enabled);
        core.set_frame_skip(preferences.frame_skip);

        info!(
            "Loaded {rom_path} ({} bytes, {} bytes cartridge RAM)",
            scene.rom.len(),
            scene.cart_ram.len()
        );
        scene.core = Some(core);
        scene.state = GameState::Loaded;
        scene
    }

    pub fn rom_path(&self) -> &str {
        &self.rom_path
    }

    pub fn save_path(&self) -> &str {
        &self.save_path
    }

    pub fn recovery_path(&self) -> &str {
        &self.recovery_path
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn error(&self) -> GameError {
        self.error
    }

    pub fn cart_ram(&self) -> &[u8] {
        &self.cart_ram
    }

    pub fn core(&self) -> Option<&C> {
        self.core.as_ref()
    }

    pub fn selector(&self) -> &CrankSelector {
        &self.selector
    }

    /// Forces a full redraw on the next update.
    pub fn invalidate(&mut self) {
        self.needs_display = true;
    }

    pub fn update<H: Host + ?Sized>(&mut self, host: &mut H, ctx: &mut SceneContext<'_>) -> SceneUpdate {
        self.selector.update(host.crank());
        let frame = self.selector.frame();

        let needs_display = self.needs_display
            || self
                .model
                .is_none_or(|m| m.state != self.state || m.error != self.error);
        let needs_selector = needs_display || self.model.is_none_or(|m| m.selector != frame);

        self.model = Some(GameModel {
            state: self.state,
            error: self.error,
            selector: frame,
        });
        self.needs_display = false;

        let pacing = match self.state {
            GameState::Loaded => self.run_frame(host, ctx, needs_display, needs_selector),
            GameState::Error => {
                if needs_display {
                    draw_message(host, self.error.title(), self.error.messages());
                }
                Pacing::IDLE
            }
        };
        SceneUpdate::paced(pacing)
    }

    fn run_frame<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &SceneContext<'_>,
        needs_display: bool,
        needs_selector: bool,
    ) -> Pacing {
        let Some(core) = self.core.as_mut() else {
            return Pacing::IDLE;
        };

        core.set_joypad(JoypadBits::from_input(
            host.buttons().current,
            self.selector.start_pressed(),
            self.selector.select_pressed(),
        ));

        if needs_display {
            host.clear(Color::Black);
        }

        let memory = CartridgeMemory {
            rom: &self.rom,
            ram: &mut self.cart_ram,
        };
        if let Err(e) = core.run_frame(memory) {
            if e.is_fatal() {
                error!("{}: {e}", self.rom_path);
                self.fail(host);
                return Pacing::IDLE;
            }
            warn!("{}: {e}", self.rom_path);
        }

        let draw = !core.frame_skipped() || needs_display;
        let pacing = if draw {
            self.converter.convert(core.framebuffer(), host, needs_display);
            Pacing::new(60.0, 1.0 / 60.0 - ctx.dt)
        } else {
            Pacing::UNPACED
        };

        self.rtc.catch_up(host.epoch_seconds(), || core.tick_rtc());

        if needs_display {
            let layout = self.layout;
            host.draw_text(
                Font::Label,
                START_LABEL,
                layout.start_label_x,
                layout.start_label_y,
                DrawMode::FillWhite,
            );
            host.draw_text(
                Font::Label,
                SELECT_LABEL,
                layout.select_label_x,
                layout.select_label_y,
                DrawMode::FillWhite,
            );
        }

        if needs_selector {
            host.draw_selector(self.selector.frame(), self.layout.x, self.layout.y);
        }

        if ctx.preferences.show_fps {
            host.draw_fps(0, 0);
        }

        pacing
    }

    /// Fatal core error: keep the RAM in a separate recovery file and stop.
    fn fail<H: Host + ?Sized>(&mut self, host: &mut H) {
        match write_cart_ram(host, &self.recovery_path, &self.cart_ram) {
            Ok(()) => info!("Wrote recovery save {}", self.recovery_path),
            Err(e) => warn!("{e}"),
        }

        self.state = GameState::Error;
        self.error = GameError::Fatal;

        host.remove_all_menu_items();
        self.populate_menu(host);
    }

    /// Writes cartridge RAM to the regular save file while a game is loaded.
    pub fn save<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.state != GameState::Loaded {
            return;
        }
        if let Err(e) = write_cart_ram(host, &self.save_path, &self.cart_ram) {
            warn!("{e}");
        }
    }

    pub fn populate_menu<H: Host + ?Sized>(&self, host: &mut H) {
        host.add_menu_item(MenuItem::action("Library", MenuAction::Library));
        if self.state == GameState::Loaded {
            host.add_menu_item(MenuItem::action("Save", MenuAction::Save));
        }
    }

    pub fn handle_menu<H: Host + ?Sized>(&mut self, host: &mut H, event: MenuEvent) -> Option<Navigation> {
        match event {
            MenuEvent::Selected(MenuAction::Library) => Some(Navigation::Library),
            MenuEvent::Selected(MenuAction::Save) => {
                self.save(host);
                None
            }
            _ => None,
        }
    }

    pub fn teardown<H: Host + ?Sized>(mut self, host: &mut H) {
        self.save(host);
    }
}

fn read_rom<H: Host + ?Sized>(host: &mut H, path: &str) -> Result<Vec<u8>, GameError> {
    let stat = host.stat(path).map_err(|e| {
        warn!("Can't open rom file {path}: {e}");
        GameError::from_fs(&e)
    })?;

    let rom = host.read(path).map_err(|e| {
        warn!("Can't read rom file {path}: {e}");
        GameError::from_fs(&e)
    })?;

    if rom.len() != stat.size {
        warn!("Can't read rom file {path}: got {} of {} bytes", rom.len(), stat.size);
        return Err(GameError::LoadingRom);
    }
    Ok(rom)
}
