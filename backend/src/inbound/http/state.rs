//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::{DEFAULT_MAX_IMAGE_BYTES, ImageRef};
use crate::domain::ports::{
    AttributeCommand, AttributeQuery, LoginService, RecipeCommand, RecipeQuery,
};

/// Parameter object bundling the port implementations used by handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub recipes: Arc<dyn RecipeCommand>,
    pub recipes_query: Arc<dyn RecipeQuery>,
    pub attributes: Arc<dyn AttributeCommand>,
    pub attributes_query: Arc<dyn AttributeQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub recipes: Arc<dyn RecipeCommand>,
    pub recipes_query: Arc<dyn RecipeQuery>,
    pub attributes: Arc<dyn AttributeCommand>,
    pub attributes_query: Arc<dyn AttributeQuery>,
    media_url: String,
    max_image_bytes: usize,
}

impl HttpState {
    /// Construct state from ports and the public prefix for stored images.
    ///
    /// A trailing `/` on `media_url` is ignored.
    pub fn new(ports: HttpStatePorts, media_url: impl Into<String>) -> Self {
        let HttpStatePorts {
            login,
            recipes,
            recipes_query,
            attributes,
            attributes_query,
        } = ports;
        let mut media_url = media_url.into();
        while media_url.ends_with('/') {
            media_url.pop();
        }
        Self {
            login,
            recipes,
            recipes_query,
            attributes,
            attributes_query,
            media_url,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Cap on bytes buffered from one multipart image field.
    #[must_use]
    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    /// Public URL at which `image` is served.
    ///
    /// # Examples
    /// ```no_run
    /// # use recipe_backend::domain::{ImageFormat, ImageRef};
    /// # use recipe_backend::inbound::http::state::HttpState;
    /// # fn demo(state: &HttpState) {
    /// let url = state.image_url(&ImageRef::fresh(ImageFormat::Png));
    /// assert!(url.starts_with("/media/recipes/"));
    /// # }
    /// ```
    pub fn image_url(&self, image: &ImageRef) -> String {
        format!("{}/{}", self.media_url, image.key())
    }
}
