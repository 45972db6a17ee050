// LogTriage - platform/fs.rs
//
// Filesystem helpers: reading captured logs and writing outputs atomically.

use std::io;
use std::path::Path;

/// Read the full content of a file as a string.
///
/// Captured stderr can contain arbitrary bytes from native libraries, so
/// invalid UTF-8 is replaced rather than rejected.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write `data` to `path` atomically (write temp → rename).
///
/// A crash between write and rename leaves the previous file untouched; a
/// reader never sees a half-written output.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        e
    })
}
