//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::{App, test as actix_test, web};
use serde_json::json;
use tempfile::TempDir;

use crate::domain::{
    AttributeService, EmailAddress, PasswordLoginService, RecipeService, hash_password,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::InMemoryStore;
use crate::outbound::storage::FsImageStore;

pub const TEST_EMAIL: &str = "cook@example.com";
pub const TEST_PASSWORD: &str = "correct horse";
pub const OTHER_EMAIL: &str = "rival@example.com";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Real services over the in-memory store and a scratch media directory.
pub struct Harness {
    pub state: HttpState,
    pub store: Arc<InMemoryStore>,
    pub media: TempDir,
}

impl Harness {
    /// Seed [`TEST_EMAIL`] and [`OTHER_EMAIL`], both with [`TEST_PASSWORD`].
    pub fn new() -> Self {
        let media = TempDir::new().expect("media dir");
        let store = Arc::new(InMemoryStore::new());
        let hash = hash_password(TEST_PASSWORD).expect("hash");
        for email in [TEST_EMAIL, OTHER_EMAIL] {
            store.seed_user(EmailAddress::new(email).expect("email"), hash.clone());
        }
        let images = Arc::new(FsImageStore::open(media.path()).expect("image store"));
        let recipes = Arc::new(RecipeService::new(
            store.clone(),
            images,
            crate::domain::DEFAULT_MAX_IMAGE_BYTES,
        ));
        let attributes = Arc::new(AttributeService::new(store.clone()));
        let state = HttpState::new(
            HttpStatePorts {
                login: Arc::new(PasswordLoginService::new(store.clone())),
                recipes: recipes.clone(),
                recipes_query: recipes,
                attributes: attributes.clone(),
                attributes_query: attributes,
            },
            "/media",
        );
        Self {
            state,
            store,
            media,
        }
    }

    /// Application with every API route and the test session middleware.
    ///
    /// The app owns a clone of the state, so it does not borrow `self`.
    pub fn app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .wrap(test_session_middleware())
            .configure(super::configure)
    }
}

/// Log in and return the session cookie.
pub async fn login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    email: &str,
) -> Cookie<'static> {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": email, "password": TEST_PASSWORD }))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert!(response.status().is_success(), "login failed: {}", response.status());
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}
