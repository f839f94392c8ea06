//! Environment-driven session cookie settings.
//!
//! Debug builds fall back to permissive defaults with a warning; release
//! builds require every toggle and a real key file.

use std::path::PathBuf;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const DEFAULT_KEY_PATH: &str = "/var/run/secrets/session_key";
const KEY_MIN_LEN: usize = 64;
// `Key::derive_from` panics below this length.
const DERIVE_MIN_LEN: usize = 32;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Cookie name shared by the server and tests.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Whether relaxed defaults are acceptable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Validated cookie session settings.
#[derive(Clone)]
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Read `SESSION_*` variables through `env`.
    pub fn from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Self, SessionConfigError> {
        let cookie_secure = toggle(env, mode, COOKIE_SECURE_ENV, BOOL_EXPECTED, parse_bool, true)?;
        let default_same_site = match mode {
            BuildMode::Debug => SameSite::Lax,
            BuildMode::Release => SameSite::Strict,
        };
        let same_site = toggle(
            env,
            mode,
            SAMESITE_ENV,
            SAMESITE_EXPECTED,
            parse_same_site,
            default_same_site,
        )?;
        if same_site == SameSite::None && !cookie_secure {
            if mode == BuildMode::Release {
                return Err(SessionConfigError::InsecureSameSiteNone);
            }
            warn!("SESSION_SAMESITE=None without a secure cookie; browsers may drop it");
        }
        let allow_ephemeral =
            toggle(env, mode, ALLOW_EPHEMERAL_ENV, BOOL_EXPECTED, parse_bool, false)?;
        if allow_ephemeral && mode == BuildMode::Release {
            return Err(SessionConfigError::EphemeralNotAllowed);
        }
        let key = load_key(env, mode, allow_ephemeral)?;
        Ok(Self {
            key,
            cookie_secure,
            same_site,
        })
    }

    /// Cookie session middleware carrying only the signed user id.
    pub fn middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name(SESSION_COOKIE_NAME.to_owned())
            .cookie_secure(self.cookie_secure)
            .cookie_same_site(self.same_site)
            .cookie_http_only(true)
            .build()
    }
}

/// Read one toggle. Debug builds warn and use `debug_default` when the value
/// is missing or malformed; release builds reject both.
fn toggle<E: Env, T>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    expected: &'static str,
    parse: fn(&str) -> Option<T>,
    debug_default: T,
) -> Result<T, SessionConfigError> {
    let Some(value) = env.string(name) else {
        if mode == BuildMode::Release {
            return Err(SessionConfigError::MissingEnv { name });
        }
        warn!(variable = name, "session toggle not set; using default");
        return Ok(debug_default);
    };
    match parse(&value) {
        Some(parsed) => Ok(parsed),
        None if mode == BuildMode::Debug => {
            warn!(variable = name, %value, "invalid session toggle; using default");
            Ok(debug_default)
        }
        None => Err(SessionConfigError::InvalidEnv {
            name,
            value,
            expected,
        }),
    }
}

fn load_key<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| DEFAULT_KEY_PATH.to_owned()),
    );
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            let result = if length >= KEY_MIN_LEN
                || (mode == BuildMode::Debug && length >= DERIVE_MIN_LEN)
            {
                Ok(Key::derive_from(&bytes))
            } else if mode == BuildMode::Debug {
                warn!(path = %path.display(), length, "session key too short; using temporary key");
                Ok(Key::generate())
            } else {
                Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: KEY_MIN_LEN,
                })
            };
            bytes.zeroize();
            result
        }
        Err(source) if mode == BuildMode::Debug || allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "using temporary session key");
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}
