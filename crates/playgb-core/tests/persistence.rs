mod common;

use common::MockHost;
use playgb_core::config::{DEFAULT_CONFIG_PATH, ShellConfig};
use playgb_core::error::{FsError, PersistError};
use playgb_core::host::HardwareRevision;
use playgb_core::persistence::{Preferences, read_cart_ram, write_cart_ram};

#[test]
fn short_save_is_zero_padded() {
    let mut host = MockHost::new().with_file("saves/a.sav", vec![1, 2, 3]);
    assert_eq!(read_cart_ram(&mut host, "saves/a.sav", 6), [1, 2, 3, 0, 0, 0]);
}

#[test]
fn long_save_is_truncated_to_ram_size() {
    let mut host = MockHost::new().with_file("saves/a.sav", vec![9; 10]);
    assert_eq!(read_cart_ram(&mut host, "saves/a.sav", 4), [9; 4]);
}

#[test]
fn missing_or_unreadable_save_is_zeroed() {
    let mut host = MockHost::new();
    assert_eq!(read_cart_ram(&mut host, "saves/a.sav", 4), [0; 4]);

    host.add_file("saves/b.sav", vec![5; 4]);
    host.fs_errors
        .insert("saves/b.sav".to_string(), FsError::new("device busy"));
    assert_eq!(read_cart_ram(&mut host, "saves/b.sav", 4), [0; 4]);

    assert!(read_cart_ram(&mut host, "saves/a.sav", 0).is_empty());
}

#[test]
fn empty_ram_is_never_written() {
    let mut host = MockHost::new();
    write_cart_ram(&mut host, "saves/a.sav", &[]).unwrap();
    assert!(host.writes.is_empty());

    write_cart_ram(&mut host, "saves/a.sav", &[4, 5]).unwrap();
    assert_eq!(host.file("saves/a.sav").unwrap(), [4, 5]);
}

#[test]
fn write_failure_is_reported() {
    let mut host = MockHost::new();
    host.write_error = Some(FsError::new("disk full"));
    let err = write_cart_ram(&mut host, "saves/a.sav", &[1]).unwrap_err();
    assert!(matches!(err, PersistError::Write { ref path, .. } if path == "saves/a.sav"));
    assert_eq!(err.to_string(), "failed to write saves/a.sav: disk full");
}

#[test]
fn preferences_round_trip_through_host() {
    let mut host = MockHost::new();
    let prefs = Preferences {
        sound_enabled: true,
        show_fps: true,
        frame_skip: false,
    };
    prefs.save(&mut host, "preferences.bin").unwrap();
    let loaded = Preferences::load(&mut host, "preferences.bin", Preferences::default()).unwrap();
    assert_eq!(loaded, prefs);
}

#[test]
fn init_keeps_defaults_when_write_fails() {
    let mut host = MockHost::new();
    host.write_error = Some(FsError::new("read-only"));
    let prefs = Preferences::init(&mut host, "preferences.bin", HardwareRevision::RevA);
    assert_eq!(prefs, Preferences::defaults_for(HardwareRevision::RevA));
    assert!(host.file("preferences.bin").is_none());
}

#[test]
fn config_file_is_read_through_host() {
    let mut host = MockHost::new().with_file(
        DEFAULT_CONFIG_PATH,
        "saves_dir = \"battery\"\n[rtc]\nmax_catch_up_secs = 60\n",
    );
    let config = ShellConfig::load_from(&mut host, DEFAULT_CONFIG_PATH);
    assert_eq!(config.saves_dir, "battery");
    assert_eq!(config.rtc.max_catch_up_secs, 60);

    let mut host = MockHost::new().with_file(DEFAULT_CONFIG_PATH, "[lcd]\nx = 3\n");
    assert_eq!(ShellConfig::load_from(&mut host, DEFAULT_CONFIG_PATH), ShellConfig::default());

    let mut host = MockHost::new();
    assert_eq!(ShellConfig::load_from(&mut host, DEFAULT_CONFIG_PATH), ShellConfig::default());
}
