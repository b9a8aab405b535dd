//! Wallet loading and message signing.
//!
//! Keys come from a plain text file, one 64-hex-character private key per
//! line (no `0x` prefix); blank lines and `#` comments are ignored, and any
//! other non-matching line is dropped with a warning on the event bus.
//! Addresses are derived with Keccak-256 and rendered in EIP-55 mixed-case
//! form; sign-in messages are signed per EIP-191 (personal message).

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::error::SourceError;
use crate::event_bus::{EventBus, LogLevel};

/// Prefix applied before hashing a personal message (EIP-191).
const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Wallet-level failure.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The key line is not 64 hex characters
    #[error("private key must be 64 hex characters")]
    InvalidKeyFormat,

    /// The bytes are not a valid secp256k1 scalar
    #[error("invalid secp256k1 private key")]
    InvalidKey,

    /// The signing operation itself failed
    #[error("signing failed: {0}")]
    Signing(String),
}

/// A signing identity: private key plus its derived address.
///
/// Immutable once constructed; one sequencer invocation owns it for the
/// duration of that invocation.
pub struct Wallet {
    signing_key: SigningKey,
    address: String,
}

// The private key never appears in Debug output.
impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Wallet {
    /// Build a wallet from a 64-hex-character private key (no `0x` prefix).
    pub fn from_hex(key_hex: &str) -> Result<Self, WalletError> {
        if key_hex.len() != 64 || !key_hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(WalletError::InvalidKeyFormat);
        }
        let bytes = hex::decode(key_hex).map_err(|_| WalletError::InvalidKeyFormat)?;
        let signing_key = SigningKey::from_slice(&bytes).map_err(|_| WalletError::InvalidKey)?;
        let address = derive_address(&signing_key);
        Ok(Self {
            signing_key,
            address,
        })
    }

    /// EIP-55 checksummed address, `0x`-prefixed.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Abbreviated address for log lines: `0xAbCd...1234`.
    #[must_use]
    pub fn short_address(&self) -> String {
        format!(
            "{}...{}",
            &self.address[..6],
            &self.address[self.address.len() - 4..]
        )
    }

    /// Sign a personal message (EIP-191).
    ///
    /// Returns the 65-byte `r || s || v` signature as `0x`-prefixed hex,
    /// with `v` in the {27, 28} convention.
    pub fn sign_personal(&self, message: &str) -> Result<String, WalletError> {
        let digest = hash_personal_message(message.as_bytes());
        let (signature, recovery) = self
            .signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| WalletError::Signing(e.to_string()))?;

        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(27 + recovery.to_byte());
        Ok(format!("0x{}", hex::encode(bytes)))
    }

    /// The public verifying key for this wallet.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        *self.signing_key.verifying_key()
    }
}

/// Keccak-256 of `data`.
fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Hash a message with the EIP-191 personal-message prefix.
fn hash_personal_message(message: &[u8]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 8 + message.len());
    buf.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    buf.extend_from_slice(message.len().to_string().as_bytes());
    buf.extend_from_slice(message);
    keccak256(&buf)
}

/// Derive the EIP-55 address from a signing key.
fn derive_address(key: &SigningKey) -> String {
    let public = key.verifying_key().to_encoded_point(false);
    // Uncompressed SEC1 point: 0x04 tag then 64 bytes of coordinates.
    let hash = keccak256(&public.as_bytes()[1..]);
    to_checksum_address(&hash[12..])
}

/// Render 20 address bytes in EIP-55 mixed-case checksum form.
fn to_checksum_address(bytes: &[u8]) -> String {
    let lower = hex::encode(bytes);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> (4 * (1 - i % 2))) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Recover the signer's verifying key from a personal message and a 65-byte
/// hex signature produced by [`Wallet::sign_personal`].
pub fn recover_personal(message: &str, signature_hex: &str) -> Result<VerifyingKey, WalletError> {
    let raw = hex::decode(signature_hex.trim_start_matches("0x"))
        .map_err(|e| WalletError::Signing(e.to_string()))?;
    if raw.len() != 65 {
        return Err(WalletError::Signing(format!(
            "expected 65 signature bytes, found {}",
            raw.len()
        )));
    }
    let signature =
        Signature::from_slice(&raw[..64]).map_err(|e| WalletError::Signing(e.to_string()))?;
    let recovery = RecoveryId::try_from(raw[64].wrapping_sub(27))
        .map_err(|e| WalletError::Signing(e.to_string()))?;

    let digest = hash_personal_message(message.as_bytes());
    VerifyingKey::recover_from_prehash(&digest, &signature, recovery)
        .map_err(|e| WalletError::Signing(e.to_string()))
}

/// Load wallets from `path`.
///
/// Invalid lines are dropped with one WARN each; zero usable keys is the
/// fatal startup condition the caller must treat as such.
pub fn load_wallets(bus: &EventBus, path: &Path) -> Result<Vec<Wallet>, SourceError> {
    bus.log(
        LogLevel::Wait,
        format!("⌛️ Loading wallets from {}...", path.display()),
    );

    let content = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut wallets = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match Wallet::from_hex(line) {
            Ok(wallet) => {
                debug!(line = number + 1, address = %wallet.address(), "loaded wallet");
                wallets.push(wallet);
            }
            Err(error) => {
                // Never echo the line itself; it may be a mistyped key.
                bus.log(
                    LogLevel::Warn,
                    format!(
                        "⚠️ Ignoring line {} of {}: {}",
                        number + 1,
                        path.display(),
                        error
                    ),
                );
            }
        }
    }

    if wallets.is_empty() {
        return Err(SourceError::NoWallets {
            path: path.display().to_string(),
        });
    }

    bus.log(
        LogLevel::Info,
        format!("✅ Successfully loaded {} private key(s).", wallets.len()),
    );
    Ok(wallets)
}
