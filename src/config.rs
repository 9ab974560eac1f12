use std::borrow::Cow;

use time::Duration;

use crate::{DEFAULT_COOKIE_NAME, DEFAULT_MAX_AGE, serializer::Serializer, signing::Algorithm};

/// Upper bound on the inflated payload size.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1 << 20;

/// Settings of the Django deployment whose session cookies are being read.
///
/// Secrets are supplied separately, see [`SessionDecoder`](crate::SessionDecoder).
#[derive(Debug, Clone)]
pub struct DjangoSessionConfig {
    pub(crate) name: Cow<'static, str>,
    pub(crate) serializer: Serializer,
    pub(crate) algorithm: Algorithm,
    pub(crate) max_age: Duration,
    pub(crate) max_payload_bytes: usize,
}

impl Default for DjangoSessionConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.into(),
            serializer: Serializer::default(),
            algorithm: Algorithm::default(),
            max_age: DEFAULT_MAX_AGE,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl DjangoSessionConfig {
    /// Cookie name (`SESSION_COOKIE_NAME`).
    #[must_use]
    pub fn with_name<N: Into<Cow<'static, str>>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Payload serializer (`SESSION_SERIALIZER`).
    #[must_use]
    pub fn with_serializer(mut self, serializer: Serializer) -> Self {
        self.serializer = serializer;
        self
    }

    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Maximum token age (`SESSION_COOKIE_AGE`).
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    #[must_use]
    pub fn with_max_payload_bytes(mut self, max_payload_bytes: usize) -> Self {
        self.max_payload_bytes = max_payload_bytes;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn serializer(&self) -> Serializer {
        self.serializer
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }
}
