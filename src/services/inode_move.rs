//! Inode-preserving folder move.
//!
//! Library software that identifies books by inode loses track of a book when
//! its files are copied. Hard-linking each file into the destination and then
//! unlinking the original keeps the inode numbers unchanged, even though the
//! folder itself is a new directory.
//!
//! Every step is reported so that a failure halfway through can be finished
//! by hand; nothing is rolled back.

use crate::report::ReportSink;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Inode number of `path`, or `None` on platforms without inodes.
pub fn inode_of(path: &Utf8Path) -> Result<Option<u64>> {
    let metadata =
        fs::metadata(path).with_context(|| format!("Failed to read metadata: {}", path))?;
    Ok(inode_from_metadata(&metadata))
}

#[cfg(unix)]
fn inode_from_metadata(metadata: &fs::Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(metadata.ino())
}

#[cfg(not(unix))]
fn inode_from_metadata(_metadata: &fs::Metadata) -> Option<u64> {
    None
}

fn format_inode(inode: Option<u64>) -> String {
    inode.map_or_else(|| "n/a".to_string(), |ino| ino.to_string())
}

/// Move the regular files of `source` into `destination` by hard link, then
/// remove `source`.
///
/// `destination` is created if it does not exist. `source` must contain only
/// regular files; anything else makes the final directory removal fail.
///
/// # Errors
///
/// Returns the first failing link, unlink or directory operation. Files
/// handled before the failure stay in `destination`.
pub fn move_preserving_inodes(
    source: &Utf8Path,
    destination: &Utf8Path,
    sink: &mut dyn ReportSink,
) -> Result<()> {
    if !destination.exists() {
        fs::create_dir_all(destination)
            .with_context(|| format!("Failed to create destination folder: {}", destination))?;
    }

    let mut files: Vec<Utf8PathBuf> = Vec::new();
    for entry in fs::read_dir(source)
        .with_context(|| format!("Failed to read source folder: {}", source))?
    {
        let entry = entry.with_context(|| format!("Failed to read entry in: {}", source))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("Failed to read file type in: {}", source))?;
        if !file_type.is_file() {
            tracing::warn!("Not moving non-regular entry: {}", entry.path().display());
            continue;
        }

        let path = Utf8PathBuf::from_path_buf(entry.path()).map_err(|path| {
            anyhow::anyhow!("File name is not valid UTF-8: {}", path.display())
        })?;
        files.push(path);
    }
    files.sort();

    for file in &files {
        let Some(name) = file.file_name() else {
            continue;
        };
        let target = destination.join(name);

        sink.emit(&format!(
            "Source inode {}: {}",
            format_inode(inode_of(file)?),
            file
        ))?;

        fs::hard_link(file, &target)
            .with_context(|| format!("Failed to hard link {} to {}", file, target))?;

        sink.emit(&format!(
            "Destination inode {}: {}",
            format_inode(inode_of(&target)?),
            target
        ))?;

        fs::remove_file(file).with_context(|| format!("Failed to remove original: {}", file))?;
    }

    sink.emit(&format!("Removing source folder: {}", source))?;
    fs::remove_dir(source).with_context(|| format!("Failed to remove source folder: {}", source))?;

    tracing::debug!("Moved {} files from {} to {}", files.len(), source, destination);
    Ok(())
}
