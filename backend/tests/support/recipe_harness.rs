//! Server harness and shared world for recipe behaviour tests.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The server runs over the in-memory
//! store and a scratch media directory. `WorldFixture` stops the server even
//! if a test panics.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{App, HttpServer, web};
use awc::Client;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

use recipe_backend::Trace;
use recipe_backend::domain::{
    AttributeService, DEFAULT_MAX_IMAGE_BYTES, EmailAddress, PasswordLoginService, RecipeService,
    hash_password,
};
use recipe_backend::inbound::http::configure;
use recipe_backend::inbound::http::session_config::SESSION_COOKIE_NAME;
use recipe_backend::inbound::http::state::{HttpState, HttpStatePorts};
use recipe_backend::outbound::memory::InMemoryStore;
use recipe_backend::outbound::storage::FsImageStore;

pub(crate) const PASSWORD: &str = "correct horse";
const BOUNDARY: &str = "recipe-world-boundary";

pub(crate) struct RecipeWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    pub(crate) media: TempDir,
    pub(crate) cookies: HashMap<String, String>,
    pub(crate) tag_ids: HashMap<String, i64>,
    pub(crate) recipe_id: Option<i64>,
    pub(crate) recipe_image: Option<Value>,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
}

pub(crate) type SharedWorld = Rc<RefCell<RecipeWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        let ctx = self.world.borrow();
        let server = ctx.server.clone();
        ctx.local.block_on(&ctx.runtime, async move {
            server.stop(true).await;
        });
    }
}

pub(crate) fn email_for(user: &str) -> String {
    format!("{user}@example.com")
}

pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

fn build_state(media: &TempDir) -> HttpState {
    let store = Arc::new(InMemoryStore::new());
    for user in ["alice", "bob"] {
        let email = EmailAddress::new(email_for(user)).expect("fixture email");
        store.seed_user(email, hash_password(PASSWORD).expect("hash"));
    }
    let images = Arc::new(FsImageStore::open(media.path()).expect("media root"));
    let recipes = Arc::new(RecipeService::new(
        store.clone(),
        images,
        DEFAULT_MAX_IMAGE_BYTES,
    ));
    let attributes = Arc::new(AttributeService::new(store.clone()));
    HttpState::new(
        HttpStatePorts {
            login: Arc::new(PasswordLoginService::new(store)),
            recipes: recipes.clone(),
            recipes_query: recipes,
            attributes: attributes.clone(),
            attributes_query: attributes,
        },
        "/media",
    )
}

fn test_session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}

async fn spawn_server(state: HttpState) -> Result<(String, ServerHandle), String> {
    let key = Key::generate();
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(test_session_middleware(key.clone()))
            .wrap(Trace)
            .configure(configure)
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

pub(crate) fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    let media = tempfile::tempdir().expect("media dir");
    let state = build_state(&media);
    let (base_url, server) = local
        .block_on(&runtime, spawn_server(state))
        .expect("spawn server");

    WorldFixture {
        world: Rc::new(RefCell::new(RecipeWorld {
            runtime,
            local,
            base_url,
            server,
            media,
            cookies: HashMap::new(),
            tag_ids: HashMap::new(),
            recipe_id: None,
            recipe_image: None,
            last_status: None,
            last_body: None,
        })),
    }
}

fn record(world: &SharedWorld, status: u16, body: Value) {
    let mut ctx = world.borrow_mut();
    ctx.last_status = Some(status);
    ctx.last_body = Some(body);
}

pub(crate) fn log_in(world: &SharedWorld, user: &str) {
    let email = email_for(user);
    let (status, cookie) = with_world_async(world, |base_url| async move {
        let response = Client::default()
            .post(format!("{base_url}/api/v1/login"))
            .send_json(&json!({ "email": email, "password": PASSWORD }))
            .await
            .expect("login request");
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_owned);
        (response.status().as_u16(), cookie)
    });
    assert_eq!(status, 200, "login should succeed for {user}");
    let cookie = cookie.expect("session cookie");
    world.borrow_mut().cookies.insert(user.to_owned(), cookie);
}

fn cookie_for(world: &SharedWorld, user: Option<&str>) -> Option<String> {
    user.map(|user| {
        world
            .borrow()
            .cookies
            .get(user)
            .cloned()
            .unwrap_or_else(|| panic!("{user} has not logged in"))
    })
}

async fn read_json<S>(mut response: awc::ClientResponse<S>) -> (u16, Value)
where
    S: futures::Stream<Item = Result<web::Bytes, awc::error::PayloadError>> + Unpin,
{
    let status = response.status().as_u16();
    let body = response.body().await.expect("body");
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, value)
}

/// Send a JSON request as `user` (or anonymously) without recording it.
pub(crate) fn request_json(
    world: &SharedWorld,
    user: Option<&str>,
    method: Method,
    path: &str,
    payload: Option<Value>,
) -> (u16, Value) {
    let cookie = cookie_for(world, user);
    let path = path.to_owned();
    with_world_async(world, |base_url| async move {
        let mut request = Client::default().request(method, format!("{base_url}{path}"));
        if let Some(cookie) = cookie {
            request = request.insert_header((header::COOKIE, cookie));
        }
        let response = match payload {
            Some(payload) => request.send_json(&payload).await,
            None => request.send().await,
        }
        .expect("request");
        read_json(response).await
    })
}

/// Send a JSON request and record the response as the latest outcome.
pub(crate) fn send_json(
    world: &SharedWorld,
    user: Option<&str>,
    method: Method,
    path: &str,
    payload: Option<Value>,
) -> Value {
    let (status, body) = request_json(world, user, method, path, payload);
    record(world, status, body.clone());
    body
}

/// Upload `content` as the `image` form field and record the response.
pub(crate) fn upload(world: &SharedWorld, user: &str, recipe_id: i64, content: Vec<u8>) -> Value {
    let cookie = cookie_for(world, Some(user));
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"upload.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(&content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let (status, value) = with_world_async(world, |base_url| async move {
        let mut request = Client::default()
            .post(format!("{base_url}/api/v1/recipes/{recipe_id}/image"))
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ));
        if let Some(cookie) = cookie {
            request = request.insert_header((header::COOKIE, cookie));
        }
        let response = request.send_body(body).await.expect("upload request");
        read_json(response).await
    });
    record(world, status, value.clone());
    value
}

pub(crate) fn png() -> Vec<u8> {
    let mut bytes = std::io::Cursor::new(Vec::new());
    image::RgbImage::new(2, 2)
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("encode png");
    bytes.into_inner()
}

/// Split a comma-separated step argument into `[{"name": ...}]` items.
pub(crate) fn named_items(names: &str) -> Value {
    Value::Array(
        names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| json!({ "name": name }))
            .collect(),
    )
}

pub(crate) fn current_recipe(world: &SharedWorld) -> i64 {
    world.borrow().recipe_id.expect("a recipe was created")
}

/// Count stored image files below the media root.
pub(crate) fn stored_images(world: &SharedWorld) -> usize {
    let dir = world.borrow().media.path().join("recipes");
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(Result::ok).count(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => 0,
        Err(err) => panic!("read media dir: {err}"),
    }
}
