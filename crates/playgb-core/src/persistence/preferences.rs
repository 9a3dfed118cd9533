use log::{info, warn};

use crate::error::PersistError;
use crate::host::{FileSystem, HardwareRevision};

pub const PREFERENCES_VERSION: u32 = 2;

const VERSION_LEN: usize = 4;

/// Stored as `[u32 BE version][u8 sound][u8 show_fps][u8 frame_skip]`,
/// with `frame_skip` from version 2 on. Fields missing from an older or
/// truncated file keep their defaults; bytes appended by a newer version are
/// ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preferences {
    pub sound_enabled: bool,
    pub show_fps: bool,
    pub frame_skip: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self::defaults_for(HardwareRevision::Unknown)
    }
}

impl Preferences {
    /// Sound defaults to on only where the speaker keeps up (revision B).
    pub fn defaults_for(revision: HardwareRevision) -> Self {
        Self {
            sound_enabled: revision == HardwareRevision::RevB,
            show_fps: false,
            frame_skip: true,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(VERSION_LEN + 3);
        out.extend_from_slice(&PREFERENCES_VERSION.to_be_bytes());
        out.push(u8::from(self.sound_enabled));
        out.push(u8::from(self.show_fps));
        out.push(u8::from(self.frame_skip));
        out
    }

    /// Decodes `bytes`, taking missing fields from `fallback`. Returns `None`
    /// when not even the version header is present.
    pub fn decode(bytes: &[u8], fallback: Self) -> Option<Self> {
        let (version, fields) = bytes.split_first_chunk::<VERSION_LEN>()?;
        let version = u32::from_be_bytes(*version);
        let field = |index: usize, default: bool| fields.get(index).map_or(default, |&b| b != 0);

        let mut prefs = fallback;
        prefs.sound_enabled = field(0, fallback.sound_enabled);
        prefs.show_fps = field(1, fallback.show_fps);
        if version >= 2 {
            prefs.frame_skip = field(2, fallback.frame_skip);
        }
        Some(prefs)
    }

    pub fn load<F: FileSystem + ?Sized>(
        fs: &mut F,
        path: &str,
        fallback: Self,
    ) -> Result<Self, PersistError> {
        let bytes = fs.read(path).map_err(|source| PersistError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::decode(&bytes, fallback).ok_or_else(|| PersistError::Truncated {
            path: path.to_string(),
            len: bytes.len(),
        })
    }

    pub fn save<F: FileSystem + ?Sized>(&self, fs: &mut F, path: &str) -> Result<(), PersistError> {
        fs.write(path, &self.encode())
            .map_err(|source| PersistError::Write {
                path: path.to_string(),
                source,
            })
    }

    /// Start-up load: a missing file is created with the defaults, an
    /// unreadable one is logged and replaced by the defaults in memory.
    pub fn init<F: FileSystem + ?Sized>(fs: &mut F, path: &str, revision: HardwareRevision) -> Self {
        let defaults = Self::defaults_for(revision);

        if !fs.exists(path) {
            info!("No preferences at {path}; writing defaults");
            if let Err(e) = defaults.save(fs, path) {
                warn!("{e}");
            }
            return defaults;
        }

        match Self::load(fs, path, defaults) {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!("{e}; using default preferences");
                defaults
            }
        }
    }
}
