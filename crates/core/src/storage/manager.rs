use crate::errors::CoreError;
use crate::models::group::Group;

use super::encryption::Envelope;
use super::format;

/// High-level storage operations: save/load a group to/from encrypted
/// bytes or files.
pub struct StorageManager;

impl StorageManager {
    /// Encrypt and serialize a group to raw bytes (portable, platform-independent).
    ///
    /// Flow: Group → bincode → AES-256-GCM(Argon2id(password)) → GPFL format bytes
    pub fn save_to_bytes(group: &Group, password: &str) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(group)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize group: {e}")))?;

        let envelope = Envelope::seal(&plaintext, password)?;

        Ok(format::write_file(format::CURRENT_VERSION, &envelope))
    }

    /// Decrypt and deserialize a group from raw bytes.
    ///
    /// Flow: GPFL bytes → parse header → Argon2id(password, salt) → AES-256-GCM decrypt → bincode → Group
    pub fn load_from_bytes(data: &[u8], password: &str) -> Result<Group, CoreError> {
        let (_version, envelope) = format::read_file(data)?;

        let plaintext = envelope.open(password)?;

        let group: Group = bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize group: {e}")))?;

        Ok(group)
    }

    /// Save a group to an encrypted file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(group: &Group, path: &str, password: &str) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(group, password)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a group from an encrypted file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str, password: &str) -> Result<Group, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(&bytes, password)
    }
}
