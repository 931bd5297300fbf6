//! Zip extraction with leading path component stripping.

use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DownloadError;

/// Extract a zip archive held in memory into `dest`.
///
/// The first `strip` path components of every entry are dropped; entries
/// left with no path after stripping (the wrapping folder itself) are
/// skipped, as are entries whose names would escape `dest`. When `mode` is
/// set, extracted files get those permission bits on unix.
pub fn extract_zip(
    data: &[u8],
    dest: &Path,
    strip: usize,
    mode: Option<u32>,
) -> Result<usize, DownloadError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
    fs::create_dir_all(dest)?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        let Some(name) = entry.enclosed_name() else {
            debug!(entry = entry.name(), "Skipping unsafe archive entry");
            continue;
        };
        let relative: PathBuf = name.components().skip(strip).collect();
        if relative.as_os_str().is_empty() {
            continue;
        }
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&outpath)?;
        io::copy(&mut entry, &mut file)?;
        set_mode(&outpath, mode)?;
        written += 1;
    }

    Ok(written)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: Option<u32>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(mode) = mode {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: Option<u32>) -> io::Result<()> {
    Ok(())
}
