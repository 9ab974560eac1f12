//! Read Django signed-cookie sessions from Rust.
//!
//! Django's `django.contrib.sessions.backends.signed_cookies` backend stores the whole session in
//! the cookie as `payload:timestamp:signature`. This crate verifies the HMAC signature and the
//! token age, inflates the payload if needed and decodes it with the configured serializer
//! (JSON or a restricted, plain-data-only subset of pickle) into a [`Session`].
//!
//! ```no_run
//! use django_cookie_session::{DEFAULT_MAX_AGE, Serializer, decode};
//!
//! # fn run(cookie: &str) -> Result<(), django_cookie_session::DecodeError> {
//! let session = decode(Serializer::Json, DEFAULT_MAX_AGE, b"django-secret-key", cookie)?;
//! let user_id = session.get("_auth_user_id").and_then(|v| v.as_str());
//! # Ok(())
//! # }
//! ```
//!
//! Only decoding is supported: this crate never issues, refreshes or clears cookies.
//!
//! # Security
//! The pickle decoder refuses every opcode that would import or instantiate a Python object, but
//! pickle remains a poor choice of wire format. Prefer the JSON serializer on the Django side.
//!
//! The `layer` feature (enabled by default) provides a read-only tower middleware that exposes
//! the decoded session as a request extension.

mod clock;
mod compress;
mod config;
mod decoder;
mod error;
pub mod format;
#[cfg(feature = "layer")]
pub mod layer;
mod serializer;
pub mod signing;
mod timestamp;
mod value;

use time::Duration;

pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::config::{DEFAULT_MAX_PAYLOAD_BYTES, DjangoSessionConfig};
pub use crate::decoder::SessionDecoder;
pub use crate::error::{DecodeError, Result};
pub use crate::serializer::Serializer;
pub use crate::signing::{Algorithm, Secret};
pub use crate::value::{Session, Value};

#[cfg(feature = "layer")]
pub use crate::layer::{DjangoSession, DjangoSessionLayer};

/// Key salt of Django's signed-cookie session backend.
pub const SALT: &str = "django.contrib.sessions.backends.signed_cookies";

/// Django's default `SESSION_COOKIE_AGE`.
pub const DEFAULT_MAX_AGE: Duration = Duration::days(14);

/// Django's default `SESSION_COOKIE_NAME`.
pub const DEFAULT_COOKIE_NAME: &str = "sessionid";

/// Verify and decode a signed session cookie against the system clock.
pub fn decode(
    serializer: Serializer,
    max_age: Duration,
    secret: &[u8],
    token: &str,
) -> Result<Session> {
    decode_with_clock(&SystemClock, serializer, max_age, secret, token)
}

/// Like [`decode`], reading the current time from `clock`.
pub fn decode_with_clock<K: Clock>(
    clock: &K,
    serializer: Serializer,
    max_age: Duration,
    secret: &[u8],
    token: &str,
) -> Result<Session> {
    let config = DjangoSessionConfig::default()
        .with_serializer(serializer)
        .with_max_age(max_age);
    decoder::loads(clock, &config, &[secret], token)
}
