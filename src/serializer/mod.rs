//! Payload deserializers.
//!
//! Django stores the session dictionary with either `JSONSerializer` or `PickleSerializer`; the
//! caller picks which one up front.

mod json;
mod pickle;

use crate::{
    error::{DecodeError, Result},
    value::{Session, Value},
};

/// Serializer the Django deployment is configured with (`SESSION_SERIALIZER`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Serializer {
    /// `django.contrib.sessions.serializers.JSONSerializer`.
    #[default]
    Json,
    /// `django.contrib.sessions.serializers.PickleSerializer`, restricted to plain data.
    Pickle,
}

impl Serializer {
    pub(crate) fn deserialize(self, bytes: &[u8]) -> Result<Session> {
        let value = match self {
            Self::Json => json::from_slice(bytes)?,
            Self::Pickle => pickle::from_slice(bytes)?,
        };

        match value {
            Value::Mapping(session) => Ok(session),
            other => Err(DecodeError::TypeMismatch(other.kind())),
        }
    }
}
