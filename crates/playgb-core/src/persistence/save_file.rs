use log::warn;

use super::{basename, join};
use crate::error::PersistError;
use crate::host::FileSystem;

/// `<saves>/<rom basename>.sav`, or `<rom basename> (recovery).sav` for the
/// dump written after a fatal core error.
pub fn save_path(saves_dir: &str, rom_path: &str, recovery: bool) -> String {
    let base = basename(rom_path);
    if recovery {
        join(saves_dir, &format!("{base} (recovery).sav"))
    } else {
        join(saves_dir, &format!("{base}.sav"))
    }
}

/// Reads `size` bytes of cartridge RAM. A missing or unreadable file gives
/// zeroed RAM and a short file is zero-padded.
pub fn read_cart_ram<F: FileSystem + ?Sized>(fs: &mut F, path: &str, size: usize) -> Vec<u8> {
    let mut ram = vec![0; size];
    if size == 0 || !fs.exists(path) {
        return ram;
    }

    match fs.read(path) {
        Ok(bytes) => {
            if bytes.len() < size {
                warn!("{path} is {} bytes, expected {size}", bytes.len());
            }
            let n = bytes.len().min(size);
            ram[..n].copy_from_slice(&bytes[..n]);
        }
        Err(source) => {
            let err = PersistError::Read {
                path: path.to_string(),
                source,
            };
            warn!("{err}");
        }
    }
    ram
}

/// Writes cartridge RAM; cartridges without RAM write nothing.
pub fn write_cart_ram<F: FileSystem + ?Sized>(
    fs: &mut F,
    path: &str,
    ram: &[u8],
) -> Result<(), PersistError> {
    if ram.is_empty() {
        return Ok(());
    }
    fs.write(path, ram).map_err(|source| PersistError::Write {
        path: path.to_string(),
        source,
    })
}
