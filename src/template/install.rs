use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use log::{debug, error, info};
use zip::ZipArchive;

use crate::error::Error;

/// Unpack `archive` into `root`, delete it, then rename the extracted
/// `extracted_dir_name` folder to `target_name`.
///
/// Returns the path of the installed project directory.
pub async fn install_archive(
  archive: &Path
, root: &Path
, extracted_dir_name: &str
, target_name: &str
) -> Result<PathBuf, Error>
{   let archive_path = archive.to_path_buf();
    let dest = root.to_path_buf();
    let extracted = tokio::task::spawn_blocking(move || {
        extract_zip(&archive_path, &dest)
      })
      .await
      .map_err(|e| Error::Other(format!("extraction task failed: {}", e)))?;

    let count = match extracted
    {   Ok(count) => count
      , Err(e) => {
          error!(
            "Error occurred while extracting {}: {}",
            archive.display(), e
          );
          return Err(e);
        }
    };
    debug!("Extracted {} entries from {}", count, archive.display());

    tokio::fs::remove_file(archive).await.map_err(|e| {
      error!("Cannot remove {}: {}", archive.display(), e);
      Error::Io(format!("{}: {}", archive.display(), e))
    })?;

    let from = root.join(extracted_dir_name);
    let to = root.join(target_name);
    if tokio::fs::try_exists(&to).await?
    {   error!("Rename target {} already exists", to.display());
        return Err(Error::TargetExists(to.display().to_string()));
    }
    tokio::fs::rename(&from, &to).await.map_err(|e| {
      error!(
        "Cannot rename {} to {}: {}",
        from.display(), to.display(), e
      );
      Error::Io(format!("{}: {}", from.display(), e))
    })?;

    info!("Installed template into {}", to.display());
    Ok(to)
}

/// Extract every entry of a zip file below `dest_dir`.
///
/// Returns the number of entries written.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<usize, Error>
{   let file = File::open(archive_path).map_err(|e| {
      Error::Io(format!("{}: {}", archive_path.display(), e))
    })?;
    let mut archive = ZipArchive::new(file).map_err(|e| {
      Error::Archive(format!("{}: {}", archive_path.display(), e))
    })?;

    for i in 0..archive.len()
    {   let mut entry = archive.by_index(i).map_err(|e| {
          Error::Archive(format!("entry {}: {}", i, e))
        })?;
        let raw = entry.name().replace('\\', "/");
        let rel = sanitize_entry_path(Path::new(&raw))?;
        let out = dest_dir.join(&rel);

        if entry.is_dir()
        {   fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent()
        {   fs::create_dir_all(parent)?;
        }
        let mut out_file = File::create(&out).map_err(|e| {
          Error::Io(format!("{}: {}", out.display(), e))
        })?;
        io::copy(&mut entry, &mut out_file).map_err(|e| {
          Error::Archive(format!("{}: {}", out.display(), e))
        })?;
        restore_mode(&out, entry.unix_mode())?;
    }

    Ok(archive.len())
}

#[cfg(unix)]
fn restore_mode(path: &Path, mode: Option<u32>) -> Result<(), Error>
{   use std::os::unix::fs::PermissionsExt;
    if let Some(mode) = mode
    {   fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn restore_mode(_path: &Path, _mode: Option<u32>) -> Result<(), Error>
{   Ok(())
}

fn sanitize_entry_path(path: &Path) -> Result<PathBuf, Error>
{   let mut cleaned = PathBuf::new();
    for component in path.components()
    {   match component
        {   Component::Prefix(_)
          | Component::RootDir
          | Component::ParentDir => {
              return Err(Error::Archive(format!(
                "entry escapes destination: {}",
                path.display()
              )));
            }
          , Component::CurDir => {}
          , Component::Normal(part) => cleaned.push(part)
        }
    }
    if cleaned.as_os_str().is_empty()
    {   return Err(Error::Archive("entry has empty path".to_string()));
    }
    Ok(cleaned)
}
