//! Runtime shell for a Game Boy front-end on a 400x240 1-bit handheld.
//!
//! The emulation core itself is an external collaborator behind the
//! [`emulator`] traits, and the device (file system, buttons, crank, frame
//! buffer, system menu) sits behind the [`host`] traits. This crate owns
//! everything in between: the [`app`] scene controller, the library and game
//! [`scene`]s, the 2bpp to 1bpp [`display`] converter, the [`crank`] mapper,
//! [`rtc`] catch-up, [`persistence`] and the [`list_view`] widget.

/// Top-level controller: owns the active/pending scene and paces frames.
pub mod app;

/// Shell configuration loaded from `playgb.toml`.
pub mod config;

/// Crank angle to soft start/select buttons.
pub mod crank;

/// 2bpp Game Boy frame to packed 1-bit LCD rows.
pub mod display;

/// Contract of the external emulation core.
pub mod emulator;

/// Error types shared across the shell.
pub mod error;

/// Contract of the device the shell runs on.
pub mod host;

/// Scrollable single-column selector.
pub mod list_view;

/// Preferences and cartridge RAM files.
pub mod persistence;

/// Real-time clock catch-up.
pub mod rtc;

/// Library and game scenes.
pub mod scene;

pub use app::App;
pub use config::ShellConfig;
pub use host::Host;
