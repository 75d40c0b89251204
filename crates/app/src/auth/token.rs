//! Session token generation and fingerprinting.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Number of random bytes behind every token.
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Width of a token fingerprint in bytes.
pub const FINGERPRINT_BYTES: usize = 32;

/// Encoded length of a token (unpadded URL-safe base64 of [`SESSION_TOKEN_BYTES`]).
pub const SESSION_TOKEN_CHARS: usize = 43;

/// Raw opaque token handed to a client exactly once.
///
/// Only the [`TokenFingerprint`] of this value is ever persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    value: String,
}

impl SessionToken {
    /// Wrap an already-encoded token value.
    #[must_use]
    pub fn from_encoded(value: String) -> Self {
        Self { value }
    }

    /// Borrow the encoded token for delivery to the client.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Compute the storage fingerprint of this token.
    #[must_use]
    pub fn fingerprint(&self) -> TokenFingerprint {
        fingerprint(&self.value)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(**redacted**)")?;
        Ok(())
    }
}

impl Drop for SessionToken {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// One-way SHA-256 digest of a raw token, used as the storage key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenFingerprint {
    bytes: [u8; FINGERPRINT_BYTES],
}

impl TokenFingerprint {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; FINGERPRINT_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FINGERPRINT_BYTES] {
        &self.bytes
    }
}

impl fmt::Display for TokenFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_hex(&self.bytes))
    }
}

impl fmt::Debug for TokenFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenFingerprint({self})")
    }
}

/// Generate a fresh token from the operating system CSPRNG.
#[must_use]
pub fn generate_token() -> SessionToken {
    let mut bytes = [0_u8; SESSION_TOKEN_BYTES];

    OsRng.fill_bytes(&mut bytes);

    let value = URL_SAFE_NO_PAD.encode(bytes);

    bytes.zeroize();

    SessionToken { value }
}

/// Fingerprint a raw token as presented by a client.
#[must_use]
pub fn fingerprint(token: &str) -> TokenFingerprint {
    TokenFingerprint::from_bytes(Sha256::digest(token.as_bytes()).into())
}

/// Cheap shape check that rejects values this codec could never have produced.
#[must_use]
pub fn is_well_formed(token: &str) -> bool {
    token.len() == SESSION_TOKEN_CHARS
        && token
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
}

fn encode_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    let mut encoded = String::with_capacity(bytes.len() * 2);

    for byte in bytes {
        encoded.push(char::from(HEX[usize::from(byte >> 4)]));
        encoded.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }

    encoded
}
