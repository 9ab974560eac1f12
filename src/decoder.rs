use crate::{
    clock::{Clock, SystemClock},
    compress,
    config::DjangoSessionConfig,
    error::Result,
    signing::{self, Secret},
    timestamp,
    value::Session,
};

/// Reusable decoder for one Django deployment.
///
/// Holds the primary secret, any fallback secrets still accepted during key rotation
/// (`SECRET_KEY_FALLBACKS`), the deployment settings and the clock used for expiry checks.
#[derive(Debug, Clone)]
pub struct SessionDecoder<K: Clock = SystemClock> {
    secrets: Vec<Secret>,
    config: DjangoSessionConfig,
    clock: K,
}

impl SessionDecoder<SystemClock> {
    pub fn new(secret: impl Into<Secret>) -> Self {
        Self {
            secrets: vec![secret.into()],
            config: DjangoSessionConfig::default(),
            clock: SystemClock,
        }
    }
}

impl<K: Clock> SessionDecoder<K> {
    #[must_use]
    pub fn with_config(mut self, config: DjangoSessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Also accept tokens signed with `secrets`, tried in order after the primary secret.
    #[must_use]
    pub fn with_fallback_secrets<I, S>(mut self, secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Secret>,
    {
        self.secrets.truncate(1);
        self.secrets.extend(secrets.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_clock<K2: Clock>(self, clock: K2) -> SessionDecoder<K2> {
        SessionDecoder {
            secrets: self.secrets,
            config: self.config,
            clock,
        }
    }

    pub fn config(&self) -> &DjangoSessionConfig {
        &self.config
    }

    /// Verify and decode a signed cookie value.
    pub fn decode(&self, token: &str) -> Result<Session> {
        loads(&self.clock, &self.config, &self.secrets, token).inspect_err(|err| {
            tracing::debug!(err = %err, "signed session cookie rejected");
        })
    }
}

/// Verify signature, then age, then unpack and deserialize the payload.
pub(crate) fn loads<K: Clock, S: AsRef<[u8]>>(
    clock: &K,
    config: &DjangoSessionConfig,
    secrets: &[S],
    token: &str,
) -> Result<Session> {
    let value = signing::unsign(config.algorithm, secrets, token)?;
    let payload = timestamp::check_max_age(value, config.max_age, clock)?;
    let bytes = compress::decompress_payload(payload, config.max_payload_bytes)?;
    config.serializer.deserialize(&bytes)
}
