//! HMAC signatures compatible with Django's `Signer`.

use std::fmt;

use hmac::{
    Hmac, Mac,
    digest::{Key, KeyInit},
};
use sha1::{Digest, Sha1};
use sha2::Sha256;
use subtle::{Choice, ConstantTimeEq};

use crate::{
    SALT,
    error::{DecodeError, Result},
    format,
};

pub(crate) const SEPARATOR: char = ':';

/// Hash function backing the HMAC.
///
/// Django signed with SHA-1 until 3.1 and with SHA-256 since.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Algorithm {
    #[default]
    Sha1,
    Sha256,
}

/// A signing secret (Django's `SECRET_KEY`).
///
/// The `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

impl AsRef<[u8]> for Secret {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Secret {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl From<String> for Secret {
    fn from(secret: String) -> Self {
        Self::new(secret)
    }
}

impl From<&[u8]> for Secret {
    fn from(secret: &[u8]) -> Self {
        Self::new(secret)
    }
}

impl From<Vec<u8>> for Secret {
    fn from(secret: Vec<u8>) -> Self {
        Self::new(secret)
    }
}

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Compute the unpadded base64 signature of `value`.
///
/// The HMAC key is the hash of `SALT ++ "signer" ++ secret`, as in Django's `salted_hmac`.
pub fn signature(algorithm: Algorithm, secret: &[u8], value: &[u8]) -> String {
    let digest = match algorithm {
        Algorithm::Sha1 => {
            let mut mac = <HmacSha1 as Mac>::new(&derive_key::<Sha1, HmacSha1>(secret));
            mac.update(value);
            mac.finalize().into_bytes().to_vec()
        }
        Algorithm::Sha256 => {
            let mut mac = <HmacSha256 as Mac>::new(&derive_key::<Sha256, HmacSha256>(secret));
            mac.update(value);
            mac.finalize().into_bytes().to_vec()
        }
    };
    format::base64_encode(&digest)
}

/// Hashed key material, zero-padded to the HMAC block size.
fn derive_key<D: Digest, M: KeyInit>(secret: &[u8]) -> Key<M> {
    let hashed = D::new()
        .chain_update(SALT)
        .chain_update("signer")
        .chain_update(secret)
        .finalize();
    let mut key = Key::<M>::default();
    key[..hashed.len()].copy_from_slice(&hashed);
    key
}

/// Verify the trailing signature of `token` against each secret in turn and return the signed
/// value.
pub fn unsign<'a, S: AsRef<[u8]>>(
    algorithm: Algorithm,
    secrets: &[S],
    token: &'a str,
) -> Result<&'a str> {
    let (value, claimed) = token
        .rsplit_once(SEPARATOR)
        .ok_or(DecodeError::MalformedToken)?;

    let verified = secrets.iter().any(|secret| {
        let expected = signature(algorithm, secret.as_ref(), value.as_bytes());
        constant_time_eq(expected.as_bytes(), claimed.as_bytes())
    });

    if verified {
        Ok(value)
    } else {
        Err(DecodeError::SignatureMismatch)
    }
}

/// Compare over the whole of `expected` regardless of where (or whether) `claimed` differs.
fn constant_time_eq(expected: &[u8], claimed: &[u8]) -> bool {
    let mut equal = Choice::from(u8::from(expected.len() == claimed.len()));
    for (i, byte) in expected.iter().enumerate() {
        let other = claimed.get(i).copied().unwrap_or(!byte);
        equal &= byte.ct_eq(&other);
    }
    equal.into()
}
