//! Filesystem helpers for job working directories and finished outputs.
//!
//! Working directories usually live on a scratch volume while finished videos
//! land on the media volume, so moves must survive EXDEV.

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error, warn};

use crate::error::{MediaError, MediaResult};

/// EXDEV on Linux and macOS.
const EXDEV: i32 = 18;

/// Move `src` to `dst`, creating the destination directory as needed.
///
/// Tries a rename first and falls back to copy-then-delete when the two paths
/// sit on different filesystems.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if !src.exists() {
        return Err(MediaError::FileNotFound(src.to_path_buf()));
    }
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).await?;
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(EXDEV) => {
            debug!(
                src = %src.display(),
                dst = %dst.display(),
                "Cross-device move, copying instead"
            );
            copy_then_remove(src, dst).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn copy_then_remove(src: &Path, dst: &Path) -> MediaResult<()> {
    // Stage next to dst so the final rename stays on one filesystem.
    let staged = dst.with_extension("partial");

    if let Err(e) = fs::copy(src, &staged).await {
        error!(src = %src.display(), "Copy during move failed: {}", e);
        let _ = fs::remove_file(&staged).await;
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&staged, dst).await {
        error!(dst = %dst.display(), "Rename of staged copy failed: {}", e);
        let _ = fs::remove_file(&staged).await;
        return Err(e.into());
    }

    if let Err(e) = fs::remove_file(src).await {
        warn!(src = %src.display(), "Could not remove source after move: {}", e);
    }
    Ok(())
}

/// Recursively delete `dir`. Returns whether anything was removed.
pub async fn remove_dir_if_exists(dir: impl AsRef<Path>) -> MediaResult<bool> {
    match fs::remove_dir_all(dir.as_ref()).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Delete a single file. Returns whether it existed.
pub async fn remove_file_if_exists(path: impl AsRef<Path>) -> MediaResult<bool> {
    match fs::remove_file(path.as_ref()).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_move_into_new_output_dir() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("job").join("output.mp4");
        let dst = dir.path().join("processed").join("job.mp4");
        fs::create_dir_all(src.parent().unwrap()).await.unwrap();
        fs::write(&src, b"video").await.unwrap();

        move_file(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dst).await.unwrap(), b"video");
    }

    #[tokio::test]
    async fn test_move_replaces_existing_output() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("new.mp4");
        let dst = dir.path().join("out.mp4");
        fs::write(&src, b"new").await.unwrap();
        fs::write(&dst, b"old").await.unwrap();

        move_file(&src, &dst).await.unwrap();

        assert_eq!(fs::read(&dst).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_move_missing_source() {
        let dir = TempDir::new().unwrap();
        let result = move_file(dir.path().join("nope"), dir.path().join("out")).await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let job = dir.path().join("job");
        fs::create_dir_all(job.join("frames")).await.unwrap();
        fs::write(job.join("frames").join("frame_00001.png"), b"x").await.unwrap();

        assert!(remove_dir_if_exists(&job).await.unwrap());
        assert!(!job.exists());
        assert!(!remove_dir_if_exists(&job).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_file_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("job.mp4");
        fs::write(&file, b"x").await.unwrap();

        assert!(remove_file_if_exists(&file).await.unwrap());
        assert!(!remove_file_if_exists(&file).await.unwrap());
    }
}
