use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::errors::CoreError;

/// Argon2id parameters for key derivation.
/// Stored in the file header so they can be upgraded in future versions
/// without breaking old group files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 65536 = 64 MB)
    pub memory_cost: u32,
    /// Number of iterations (default: 3)
    pub time_cost: u32,
    /// Degree of parallelism (default: 4)
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65_536, // 64 MB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// A password-sealed payload: everything needed to decrypt later except
/// the password itself.
///
/// Scheme: Argon2id(password, salt) → AES-256-GCM key; the GCM tag rides
/// at the end of `ciphertext`, so integrity comes for free and no separate
/// HMAC is needed.
#[derive(Debug)]
pub struct Envelope {
    pub kdf_params: KdfParams,
    pub salt: [u8; 16],
    pub nonce: [u8; 12],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Encrypt `plaintext` under `password` with a fresh random salt and
    /// nonce. Salt and nonce must never be reused across saves.
    pub fn seal(plaintext: &[u8], password: &str) -> Result<Self, CoreError> {
        let kdf_params = KdfParams::default();
        let salt = random_bytes::<16>()?;
        let nonce = random_bytes::<12>()?;
        let key = derive_key(password, &salt, &kdf_params)?;

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| CoreError::Encryption(format!("Encryption failed: {e}")))?;

        Ok(Self {
            kdf_params,
            salt,
            nonce,
            ciphertext,
        })
    }

    /// Decrypt with the password that sealed this envelope.
    ///
    /// The GCM tag is verified automatically; a wrong password or tampered
    /// data both surface as `CoreError::Decryption`.
    pub fn open(&self, password: &str) -> Result<Vec<u8>, CoreError> {
        let key = derive_key(password, &self.salt, &self.kdf_params)?;

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
        cipher
            .decrypt(Nonce::from_slice(&self.nonce), self.ciphertext.as_slice())
            .map_err(|_| CoreError::Decryption)
    }
}

/// Derive a 256-bit key from a password using Argon2id.
pub fn derive_key(
    password: &str,
    salt: &[u8; 16],
    params: &KdfParams,
) -> Result<[u8; 32], CoreError> {
    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(32), // output length = 256 bits
    )
    .map_err(|e| CoreError::Encryption(format!("Invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = [0u8; 32];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| CoreError::Encryption(format!("Argon2 key derivation failed: {e}")))?;

    Ok(key)
}

/// Cryptographically secure random bytes (salts, nonces).
fn random_bytes<const N: usize>() -> Result<[u8; N], CoreError> {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf)
        .map_err(|e| CoreError::Encryption(format!("Failed to generate random bytes: {e}")))?;
    Ok(buf)
}
