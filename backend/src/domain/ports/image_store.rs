//! Driven port for image byte storage.

use async_trait::async_trait;

use crate::domain::ImageRef;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// Bytes could not be written or removed.
        Io { message: String } => "image store i/o failed: {message}",
    }
}

/// Byte storage addressed by [`ImageRef`] keys.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Write `bytes` under the key of `image`.
    async fn put(&self, image: &ImageRef, bytes: Vec<u8>) -> Result<(), ImageStoreError>;

    /// Remove the bytes for `image`. Removing a missing key succeeds.
    async fn remove(&self, image: &ImageRef) -> Result<(), ImageStoreError>;
}
