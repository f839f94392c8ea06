//! Filesystem-backed image storage rooted at the media directory.
//!
//! Keys are relative paths such as `recipes/<uuid>.png`. All access goes
//! through a capability [`Dir`], so an image key can never escape the root.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{IMAGE_KEY_PREFIX, ImageRef};

/// Image store writing under one media root.
#[derive(Clone)]
pub struct FsImageStore {
    root: Arc<Dir>,
    root_path: PathBuf,
}

impl FsImageStore {
    /// Open (creating if needed) `root` and its image subdirectory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, ImageStoreError> {
        let root_path = root.as_ref().to_path_buf();
        Dir::create_ambient_dir_all(&root_path, ambient_authority())
            .map_err(|err| io_error(&root_path, &err))?;
        let dir = Dir::open_ambient_dir(&root_path, ambient_authority())
            .map_err(|err| io_error(&root_path, &err))?;
        dir.create_dir_all(IMAGE_KEY_PREFIX)
            .map_err(|err| io_error(&root_path.join(IMAGE_KEY_PREFIX), &err))?;
        Ok(Self {
            root: Arc::new(dir),
            root_path,
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, ImageStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir, &Path) -> Result<T, ImageStoreError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        let root_path = self.root_path.clone();
        tokio::task::spawn_blocking(move || f(&root, &root_path))
            .await
            .map_err(|err| ImageStoreError::io(format!("image store task aborted: {err}")))?
    }
}

fn io_error(path: &Path, error: &io::Error) -> ImageStoreError {
    ImageStoreError::io(format!("{}: {error}", path.display()))
}

/// Write to a staging name, then rename into place.
fn write_atomically(dir: &Dir, root: &Path, key: &str, bytes: &[u8]) -> Result<(), ImageStoreError> {
    let staging = format!("{IMAGE_KEY_PREFIX}/.tmp-{}", Uuid::new_v4().simple());
    dir.write(&staging, bytes)
        .map_err(|err| io_error(&root.join(&staging), &err))?;
    if let Err(err) = dir.rename(&staging, dir, key) {
        let _cleanup = dir.remove_file(&staging);
        return Err(io_error(&root.join(key), &err));
    }
    Ok(())
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn put(&self, image: &ImageRef, bytes: Vec<u8>) -> Result<(), ImageStoreError> {
        let key = image.key().to_owned();
        debug!(%key, size = bytes.len(), "storing image");
        self.blocking(move |dir, root| write_atomically(dir, root, &key, &bytes))
            .await
    }

    async fn remove(&self, image: &ImageRef) -> Result<(), ImageStoreError> {
        let key = image.key().to_owned();
        self.blocking(move |dir, root| match dir.remove_file(&key) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(%key, "image already absent");
                Ok(())
            }
            Err(err) => Err(io_error(&root.join(&key), &err)),
        })
        .await
    }
}
