use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Reasons a signed session cookie is rejected.
///
/// Every variant is terminal: callers should treat all of them as "reject this cookie". Messages
/// never contain the secret, the token or the expected signature.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A required `:` separator is missing.
    #[error("malformed token: missing `:` separator")]
    MalformedToken,

    #[error("signature mismatch")]
    SignatureMismatch,

    /// The embedded timestamp is not valid base62 or not a representable date.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The token was issued more than `max_age` before now. Both fields are Unix seconds.
    #[error("token issued at {issued_at} expired before {now}")]
    Expired { issued_at: i64, now: i64 },

    #[error("invalid base64 payload: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("failed to inflate payload: {0}")]
    Decompression(String),

    /// The payload uses a construct the restricted deserializer refuses to interpret.
    #[error("unsupported payload format: {0}")]
    UnsupportedFormat(String),

    /// The decoded top-level value is not a mapping.
    #[error("expected a mapping at the top level, found {0}")]
    TypeMismatch(&'static str),

    #[error("mapping key is not a string: {0}")]
    KeyType(String),

    /// The payload is syntactically broken (bad JSON, truncated pickle stream).
    #[error("failed to deserialize payload: {0}")]
    Deserialize(String),
}
