use log::{debug, info, warn};

use super::{Navigation, Pacing, SceneContext, SceneUpdate, draw_message};
use crate::config::ShellConfig;
use crate::host::{Buttons, Color, Host, MenuAction, MenuEvent, MenuItem, Rect};
use crate::list_view::{ListItem, ListView};
use crate::persistence::{Preferences, basename, join};

const ROM_EXTENSIONS: [&str; 2] = ["gb", "gbc"];
const COVER_EXTENSION: &str = "pdi";
/// List width when a cover panel is shown on the right.
const LIST_WIDTH_WITH_COVERS: i32 = 240;
const COVER_INSET: i32 = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    pub filename: String,
    pub path: String,
    pub cover: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LibraryTab {
    List,
    Empty,
}

pub struct LibraryScene {
    games: Vec<Game>,
    list: ListView,
    tab: LibraryTab,
    drawn_tab: Option<LibraryTab>,
    /// Selection whose cover panel is on screen.
    drawn_cover: Option<Option<usize>>,
    scanned: bool,
}

impl Default for LibraryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl LibraryScene {
    pub fn new() -> Self {
        Self {
            games: Vec::new(),
            list: ListView::default(),
            tab: LibraryTab::List,
            drawn_tab: None,
            drawn_cover: None,
            scanned: false,
        }
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn tab(&self) -> LibraryTab {
        self.tab
    }

    pub fn list(&self) -> &ListView {
        &self.list
    }

    pub fn selected_game(&self) -> Option<&Game> {
        self.list.selected().and_then(|i| self.games.get(i))
    }

    fn has_covers(&self) -> bool {
        self.games.iter().any(|g| g.cover.is_some())
    }

    /// Rescans the games directory and rebuilds the list.
    pub fn reload<H: Host + ?Sized>(&mut self, host: &mut H, config: &ShellConfig) {
        self.games = scan_games(host, config);
        info!("Found {} games in {}", self.games.len(), config.games_dir);

        self.list.set_items(
            self.games
                .iter()
                .map(|game| ListItem::button(game.filename.clone()))
                .collect(),
        );
        self.tab = if self.games.is_empty() {
            LibraryTab::Empty
        } else {
            LibraryTab::List
        };
        self.drawn_cover = None;
    }

    pub fn update<H: Host + ?Sized>(&mut self, host: &mut H, ctx: &mut SceneContext<'_>) -> SceneUpdate {
        if !self.scanned {
            self.scanned = true;
            self.reload(host, ctx.config);
        }

        let buttons = host.buttons();
        let mut navigation = None;
        if buttons.released.contains(Buttons::A)
            && let Some(game) = self.selected_game()
        {
            info!("Opening {}", game.path);
            navigation = Some(Navigation::OpenGame {
                path: game.path.clone(),
            });
        }

        let needs_display = self.drawn_tab != Some(self.tab);
        self.drawn_tab = Some(self.tab);
        if needs_display {
            host.clear(Color::White);
            self.list.invalidate();
            self.drawn_cover = None;
        }

        match self.tab {
            LibraryTab::List => {
                let (width, height) = host.display_size();
                let list_width = if self.has_covers() {
                    LIST_WIDTH_WITH_COVERS
                } else {
                    width
                };
                self.list.set_frame(Rect::new(0, 0, list_width, height));
                self.list.update(buttons, ctx.crank_change, ctx.dt);
                self.list.draw(host);
                self.draw_cover(host);
            }
            LibraryTab::Empty => {
                if needs_display {
                    draw_message(host, "PlayGB", &["No ROMs found"]);
                }
            }
        }

        SceneUpdate {
            pacing: Pacing::IDLE,
            navigation,
        }
    }

    fn draw_cover<H: Host + ?Sized>(&mut self, host: &mut H) {
        if !self.has_covers() {
            return;
        }
        let selected = self.list.selected();
        if self.drawn_cover == Some(selected) {
            return;
        }
        self.drawn_cover = Some(selected);

        let (width, height) = host.display_size();
        let panel = Rect::new(LIST_WIDTH_WITH_COVERS, 0, width - LIST_WIDTH_WITH_COVERS, height);
        host.fill_rect(panel, Color::White);

        let Some(cover) = self.selected_game().and_then(|g| g.cover.as_deref()) else {
            return;
        };
        let size = (panel.width - COVER_INSET * 2).min(panel.height - COVER_INSET * 2);
        let rect = Rect::new(
            panel.x + (panel.width - size) / 2,
            panel.y + (panel.height - size) / 2,
            size,
            size,
        );
        if !host.draw_image(cover, rect) {
            debug!("Cover {cover} could not be loaded");
        }
    }

    pub fn populate_menu<H: Host + ?Sized>(&self, host: &mut H, preferences: &Preferences) {
        host.add_menu_item(MenuItem::action("Refresh", MenuAction::Refresh));
        host.add_menu_item(MenuItem::checkmark(
            "Sound",
            MenuAction::Sound,
            preferences.sound_enabled,
        ));
        host.add_menu_item(MenuItem::checkmark(
            "Show FPS",
            MenuAction::ShowFps,
            preferences.show_fps,
        ));
        host.add_menu_item(MenuItem::checkmark(
            "Frame skip",
            MenuAction::FrameSkip,
            preferences.frame_skip,
        ));
    }

    pub fn handle_menu<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        event: MenuEvent,
        ctx: &mut SceneContext<'_>,
    ) -> Option<Navigation> {
        let prefs = &mut *ctx.preferences;
        match event {
            MenuEvent::Selected(MenuAction::Refresh) => self.reload(host, ctx.config),
            MenuEvent::Toggled(MenuAction::Sound, value) => prefs.sound_enabled = value,
            MenuEvent::Toggled(MenuAction::ShowFps, value) => prefs.show_fps = value,
            MenuEvent::Toggled(MenuAction::FrameSkip, value) => prefs.frame_skip = value,
            _ => {}
        }
        None
    }
}

fn is_rom(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| {
            !stem.is_empty() && ROM_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e))
        })
}

/// `.gb`/`.gbc` files in the games directory, sorted by file name.
pub fn scan_games<H: Host + ?Sized>(host: &mut H, config: &ShellConfig) -> Vec<Game> {
    let mut filenames = match host.list_files(&config.games_dir) {
        Ok(names) => names,
        Err(e) => {
            warn!("Can't list {}: {e}", config.games_dir);
            return Vec::new();
        }
    };
    filenames.retain(|name| is_rom(name));
    filenames.sort();

    filenames
        .into_iter()
        .map(|filename| {
            let path = join(&config.games_dir, &filename);
            let cover = (!config.covers_dir.is_empty())
                .then(|| {
                    join(
                        &config.covers_dir,
                        &format!("{}.{COVER_EXTENSION}", basename(&filename)),
                    )
                })
                .filter(|cover| host.exists(cover));
            Game {
                filename,
                path,
                cover,
            }
        })
        .collect()
}
