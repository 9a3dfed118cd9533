pub mod game;
pub mod library;

use crate::config::ShellConfig;
use crate::emulator::Emulator;
use crate::host::{Color, DrawMode, Font, Host, MenuEvent};
use crate::persistence::Preferences;

pub use game::{GameError, GameScene, GameState};
pub use library::{Game, LibraryScene, LibraryTab};

/// Frame pacing requested by a scene for the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pacing {
    /// Target frames per second; 0 leaves pacing to the host.
    pub refresh_rate: f32,
    /// Seconds added to the frame interval.
    pub compensation: f32,
}

impl Pacing {
    /// Default for scenes that only redraw on change.
    pub const IDLE: Self = Self {
        refresh_rate: 30.0,
        compensation: 0.0,
    };

    pub const UNPACED: Self = Self {
        refresh_rate: 0.0,
        compensation: 0.0,
    };

    pub const fn new(refresh_rate: f32, compensation: f32) -> Self {
        Self {
            refresh_rate,
            compensation,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::IDLE
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    OpenGame { path: String },
    Library,
}

/// Per-tick state shared with the active scene.
pub struct SceneContext<'a> {
    /// Seconds since the previous tick.
    pub dt: f32,
    /// Crank rotation in degrees since the previous tick.
    pub crank_change: f32,
    pub preferences: &'a mut Preferences,
    pub config: &'a ShellConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneUpdate {
    pub pacing: Pacing,
    pub navigation: Option<Navigation>,
}

impl SceneUpdate {
    pub fn paced(pacing: Pacing) -> Self {
        Self {
            pacing,
            navigation: None,
        }
    }
}

pub enum Scene<C: Emulator> {
    Library(LibraryScene),
    Game(GameScene<C>),
}

impl<C: Emulator> Scene<C> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Library(_) => "library",
            Self::Game(_) => "game",
        }
    }

    pub fn update<H: Host + ?Sized>(&mut self, host: &mut H, ctx: &mut SceneContext<'_>) -> SceneUpdate {
        match self {
            Self::Library(scene) => scene.update(host, ctx),
            Self::Game(scene) => scene.update(host, ctx),
        }
    }

    /// Adds this scene's items to an emptied system menu.
    pub fn populate_menu<H: Host + ?Sized>(&self, host: &mut H, preferences: &Preferences) {
        match self {
            Self::Library(scene) => scene.populate_menu(host, preferences),
            Self::Game(scene) => scene.populate_menu(host),
        }
    }

    pub fn handle_menu<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        event: MenuEvent,
        ctx: &mut SceneContext<'_>,
    ) -> Option<Navigation> {
        match self {
            Self::Library(scene) => scene.handle_menu(host, event, ctx),
            Self::Game(scene) => scene.handle_menu(host, event),
        }
    }

    /// Runs the scene's exit work (the game scene saves cartridge RAM here).
    pub fn teardown<H: Host + ?Sized>(self, host: &mut H) {
        match self {
            Self::Library(_) => {}
            Self::Game(scene) => scene.teardown(host),
        }
    }

    pub fn as_library(&self) -> Option<&LibraryScene> {
        match self {
            Self::Library(scene) => Some(scene),
            Self::Game(_) => None,
        }
    }

    pub fn as_game(&self) -> Option<&GameScene<C>> {
        match self {
            Self::Game(scene) => Some(scene),
            Self::Library(_) => None,
        }
    }
}

const TITLE_TO_MESSAGE_SPACING: i32 = 6;
const MESSAGE_LINE_SPACING: i32 = 2;

/// Clears to white and draws a title over message lines, centred on screen.
pub(crate) fn draw_message<H: Host + ?Sized>(host: &mut H, title: &str, messages: &[&str]) {
    let (width, height) = host.display_size();
    host.clear(Color::White);

    let title_height = host.font_height(Font::Title);
    let line_height = host.font_height(Font::Body);
    let lines = messages.len() as i32;
    let messages_height = line_height * lines + MESSAGE_LINE_SPACING * (lines - 1).max(0);
    let container_height = title_height + TITLE_TO_MESSAGE_SPACING + messages_height;

    let title_x = (width - host.text_width(Font::Title, title)) / 2;
    let title_y = (height - container_height) / 2;
    host.draw_text(Font::Title, title, title_x, title_y, DrawMode::Copy);

    let mut y = title_y + title_height + TITLE_TO_MESSAGE_SPACING;
    for message in messages {
        let x = (width - host.text_width(Font::Body, message)) / 2;
        host.draw_text(Font::Body, message, x, y, DrawMode::Copy);
        y += line_height + MESSAGE_LINE_SPACING;
    }
}
