pub mod preferences;
pub mod save_file;

pub use preferences::Preferences;
pub use save_file::{read_cart_ram, save_path, write_cart_ram};

/// Joins data-directory relative path segments with `/`.
pub(crate) fn join(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// File name without directory and without its last extension.
pub fn basename(path: &str) -> &str {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rfind('.') {
        Some(0) | None => file,
        Some(dot) => &file[..dot],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_strips_directory_and_extension() {
        assert_eq!(basename("games/Tetris.gb"), "Tetris");
        assert_eq!(basename("games/Pokemon Gold.v1.0.gbc"), "Pokemon Gold.v1.0");
        assert_eq!(basename("plain"), "plain");
        assert_eq!(basename("games/.hidden"), ".hidden");
    }

    #[test]
    fn join_handles_trailing_slash() {
        assert_eq!(join("saves/", "a.sav"), "saves/a.sav");
        assert_eq!(join("saves", "a.sav"), "saves/a.sav");
        assert_eq!(join("", "a.sav"), "a.sav");
    }
}
