//! Signed one-shot flash messages.
//!
//! A flash travels in a cookie between a redirect and the next page view.
//! The value is HMAC-SHA256 signed so a client cannot forge messages.
//! Format: `<payload_hex>.<hmac_hex>` where the payload is `<level>:<message>`.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Name of the cookie carrying the flash.
pub const FLASH_COOKIE: &str = "itinera_flash";

/// Errors that can occur while decoding a flash cookie.
#[derive(Debug, thiserror::Error)]
pub enum FlashError {
    #[error("invalid flash format: {0}")]
    InvalidFormat(String),

    #[error("unknown flash level: {0:?}")]
    UnknownLevel(String),

    #[error("flash signature verification failed")]
    SignatureMismatch,
}

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Error,
}

impl fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
        })
    }
}

impl FromStr for FlashLevel {
    type Err = FlashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            other => Err(FlashError::UnknownLevel(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Signing key for flash cookies.
#[derive(Clone)]
pub struct FlashSigner {
    secret: Vec<u8>,
}

impl fmt::Debug for FlashSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlashSigner").finish_non_exhaustive()
    }
}

impl FlashSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Encode and sign a message into a cookie value.
    pub fn sign(&self, flash: &FlashMessage) -> String {
        let payload = format!("{}:{}", flash.level, flash.message);
        let mac = compute_hmac(&self.secret, payload.as_bytes());
        format!("{}.{}", hex::encode(payload), hex::encode(mac))
    }

    /// Verify a cookie value and decode the message it carries.
    pub fn verify(&self, value: &str) -> Result<FlashMessage, FlashError> {
        let (payload_hex, mac_hex) = value
            .split_once('.')
            .ok_or_else(|| FlashError::InvalidFormat("missing signature separator".to_owned()))?;

        let payload = hex::decode(payload_hex)
            .map_err(|e| FlashError::InvalidFormat(format!("invalid hex in payload: {e}")))?;
        let provided_mac = hex::decode(mac_hex)
            .map_err(|e| FlashError::InvalidFormat(format!("invalid hex in signature: {e}")))?;

        let mut mac = new_mac(&self.secret);
        mac.update(&payload);
        mac.verify_slice(&provided_mac)
            .map_err(|_| FlashError::SignatureMismatch)?;

        let payload = String::from_utf8(payload)
            .map_err(|_| FlashError::InvalidFormat("payload is not UTF-8".to_owned()))?;
        let (level, message) = payload
            .split_once(':')
            .ok_or_else(|| FlashError::InvalidFormat("missing level separator".to_owned()))?;

        Ok(FlashMessage {
            level: level.parse()?,
            message: message.to_owned(),
        })
    }
}

fn new_mac(key: &[u8]) -> HmacSha256 {
    // HMAC accepts keys of any length, so this never fails.
    match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC can take key of any size"),
    }
}

fn compute_hmac(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = new_mac(key);
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}
