use std::time::Duration;

use log::{debug, info, warn};

use crate::config::ShellConfig;
use crate::emulator::EmulatorFactory;
use crate::host::{Host, MenuEvent};
use crate::persistence::Preferences;
use crate::scene::{GameScene, LibraryScene, Navigation, Pacing, Scene, SceneContext};

pub struct App<F: EmulatorFactory> {
    factory: F,
    config: ShellConfig,
    preferences: Preferences,
    scene: Option<Scene<F::Core>>,
    pending: Option<Scene<F::Core>>,
    dt: f32,
    crank_change: f32,
    pacing: Pacing,
}

impl<F: EmulatorFactory> App<F> {
    /// Prepares the data directories, loads preferences and queues the
    /// library as the first scene.
    pub fn initialize<H: Host + ?Sized>(host: &mut H, factory: F, config: ShellConfig) -> Self {
        for dir in [&config.games_dir, &config.saves_dir] {
            if let Err(e) = host.mkdir(dir) {
                warn!("Can't create {dir}: {e}");
            }
        }

        let revision = host.hardware_revision();
        let preferences = Preferences::init(host, &config.preferences_file, revision);
        debug!("Preferences: {preferences:?}");

        let mut app = Self {
            factory,
            config,
            preferences,
            scene: None,
            pending: None,
            dt: 0.0,
            crank_change: 0.0,
            pacing: Pacing::IDLE,
        };
        app.present(Scene::Library(LibraryScene::new()));
        app
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn scene(&self) -> Option<&Scene<F::Core>> {
        self.scene.as_ref()
    }

    pub fn has_pending_scene(&self) -> bool {
        self.pending.is_some()
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn crank_change(&self) -> f32 {
        self.crank_change
    }

    /// Pacing applied at the end of the last tick.
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Queues `scene`; it becomes active at the end of the current or next
    /// tick. A scene queued earlier and not yet installed is dropped.
    pub fn present(&mut self, scene: Scene<F::Core>) {
        if let Some(previous) = self.pending.replace(scene) {
            debug!("Replacing pending {} scene", previous.name());
        }
    }

    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H, dt: f32) {
        self.dt = dt;
        self.crank_change = host.crank().change;

        while let Some(event) = host.poll_menu_event() {
            self.dispatch_menu_event(host, event);
        }

        let mut pacing = Pacing::IDLE;
        if let Some(scene) = self.scene.as_mut() {
            let mut ctx = SceneContext {
                dt: self.dt,
                crank_change: self.crank_change,
                preferences: &mut self.preferences,
                config: &self.config,
            };
            let update = scene.update(host, &mut ctx);
            pacing = update.pacing;
            if let Some(navigation) = update.navigation {
                self.navigate(host, navigation);
            }
        }

        if self.install_pending(host) {
            pacing = Pacing::IDLE;
        }
        self.pacing = pacing;

        if let Some(residual) = pacing_residual(pacing, host.elapsed()) {
            host.sleep(residual);
        }
    }

    fn dispatch_menu_event<H: Host + ?Sized>(&mut self, host: &mut H, event: MenuEvent) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        debug!("Menu event {event:?} for {} scene", scene.name());

        let mut ctx = SceneContext {
            dt: self.dt,
            crank_change: self.crank_change,
            preferences: &mut self.preferences,
            config: &self.config,
        };
        if let Some(navigation) = scene.handle_menu(host, event, &mut ctx) {
            self.navigate(host, navigation);
        }
    }

    fn navigate<H: Host + ?Sized>(&mut self, host: &mut H, navigation: Navigation) {
        let scene = match navigation {
            Navigation::OpenGame { path } => Scene::Game(GameScene::new(
                host,
                &mut self.factory,
                &path,
                &self.config,
                &self.preferences,
            )),
            Navigation::Library => Scene::Library(LibraryScene::new()),
        };
        self.present(scene);
    }

    /// Swaps in the pending scene, if any. Returns whether a swap happened.
    fn install_pending<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        let Some(next) = self.pending.take() else {
            return false;
        };

        if let Some(outgoing) = self.scene.take() {
            self.save_preferences(host);
            outgoing.teardown(host);
        }

        info!("Presenting {} scene", next.name());
        host.remove_all_menu_items();
        next.populate_menu(host, &self.preferences);
        self.scene = Some(next);
        true
    }

    fn save_preferences<H: Host + ?Sized>(&self, host: &mut H) {
        if let Err(e) = self.preferences.save(host, &self.config.preferences_file) {
            warn!("{e}");
        }
    }

    /// Persists preferences and runs the active scene's exit work.
    pub fn shutdown<H: Host + ?Sized>(mut self, host: &mut H) {
        info!("Shutting down");
        self.save_preferences(host);
        if let Some(scene) = self.scene.take() {
            scene.teardown(host);
        }
    }
}

/// Time left to wait so that the frame lasts `1 / rate + compensation`
/// seconds, given `elapsed` already spent. `None` when unpaced or late.
pub fn pacing_residual(pacing: Pacing, elapsed: Duration) -> Option<Duration> {
    if pacing.refresh_rate <= 0.0 {
        return None;
    }
    let interval = 1.0 / pacing.refresh_rate + pacing.compensation;
    let interval = Duration::try_from_secs_f32(interval).ok()?;
    interval.checked_sub(elapsed).filter(|d| !d.is_zero())
}
