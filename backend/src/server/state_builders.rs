//! Builders wiring repositories and the image store into HTTP state ports.

use std::io;
use std::sync::Arc;

use tracing::{info, warn};

use recipe_backend::domain::ports::{
    AttributeRepository, ImageStore, RecipeRepository, UserRepository,
};
use recipe_backend::domain::{
    AttributeService, EmailAddress, PasswordLoginService, RecipeService, hash_password,
};
use recipe_backend::inbound::http::state::{HttpState, HttpStatePorts};
use recipe_backend::outbound::memory::InMemoryStore;
use recipe_backend::outbound::persistence::{
    DieselAttributeRepository, DieselRecipeRepository, DieselUserRepository,
};
use recipe_backend::outbound::storage::FsImageStore;

use super::ServerConfig;
use super::config::Storage;

/// Compose the services over one set of driven adapters.
fn build_ports<R, A, U, S>(
    recipes: Arc<R>,
    attributes: Arc<A>,
    users: Arc<U>,
    images: Arc<S>,
    max_image_bytes: usize,
) -> HttpStatePorts
where
    R: RecipeRepository + 'static,
    A: AttributeRepository + 'static,
    U: UserRepository + 'static,
    S: ImageStore + 'static,
{
    let recipe_service = Arc::new(RecipeService::new(recipes, images, max_image_bytes));
    let attribute_service = Arc::new(AttributeService::new(attributes));
    HttpStatePorts {
        login: Arc::new(PasswordLoginService::new(users)),
        recipes: recipe_service.clone(),
        recipes_query: recipe_service,
        attributes: attribute_service.clone(),
        attributes_query: attribute_service,
    }
}

fn seeded_store(demo_user: Option<&(String, String)>) -> io::Result<InMemoryStore> {
    let store = InMemoryStore::new();
    if let Some((email, password)) = demo_user {
        let email = EmailAddress::new(email)
            .map_err(|err| io::Error::other(format!("invalid demo user email: {err}")))?;
        let hash = hash_password(password).map_err(|err| io::Error::other(err.to_string()))?;
        let account = store.seed_user(email, hash);
        info!(user_id = %account.id, "seeded demo user");
    }
    Ok(store)
}

/// Build the handler state for `config`.
///
/// # Errors
/// Returns [`io::Error`] when the media directory cannot be opened or the
/// demo user is malformed.
pub(crate) fn build_http_state(config: &ServerConfig) -> io::Result<HttpState> {
    let images = Arc::new(
        FsImageStore::open(&config.media_root).map_err(|err| io::Error::other(err.to_string()))?,
    );
    let ports = match &config.storage {
        Storage::Postgres(pool) => build_ports(
            Arc::new(DieselRecipeRepository::new(pool.clone())),
            Arc::new(DieselAttributeRepository::new(pool.clone())),
            Arc::new(DieselUserRepository::new(pool.clone())),
            images,
            config.max_image_bytes,
        ),
        Storage::Memory { demo_user } => {
            warn!("no database configured; data is kept in memory");
            let store = Arc::new(seeded_store(demo_user.as_ref())?);
            build_ports(
                store.clone(),
                store.clone(),
                store,
                images,
                config.max_image_bytes,
            )
        }
    };
    Ok(HttpState::new(ports, config.media_url.clone()).with_max_image_bytes(config.max_image_bytes))
}
