use super::encryption::{Envelope, KdfParams};
use crate::errors::CoreError;

/// Magic bytes identifying a GPFL (Groupfolio) file.
pub const MAGIC: &[u8; 4] = b"GPFL";

/// Current file format version.
pub const CURRENT_VERSION: u16 = 1;

/// Minimum header size in bytes:
/// magic(4) + version(2) + kdf_params(12) + salt(16) + nonce(12) + ciphertext_len(8) = 54
pub const MIN_HEADER_SIZE: usize = 54;

/// Serialize a sealed envelope into portable file bytes.
///
/// Layout:
/// ```text
/// [GPFL: 4B] [version: 2B LE] [memory_cost: 4B LE] [time_cost: 4B LE]
/// [parallelism: 4B LE] [salt: 16B] [nonce: 12B] [ciphertext_len: 8B LE]
/// [ciphertext: variable]
/// ```
pub fn write_file(version: u16, envelope: &Envelope) -> Vec<u8> {
    let ciphertext_len = envelope.ciphertext.len() as u64;
    let mut buf = Vec::with_capacity(MIN_HEADER_SIZE + envelope.ciphertext.len());

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&version.to_le_bytes());
    buf.extend_from_slice(&envelope.kdf_params.memory_cost.to_le_bytes());
    buf.extend_from_slice(&envelope.kdf_params.time_cost.to_le_bytes());
    buf.extend_from_slice(&envelope.kdf_params.parallelism.to_le_bytes());
    buf.extend_from_slice(&envelope.salt);
    buf.extend_from_slice(&envelope.nonce);
    buf.extend_from_slice(&ciphertext_len.to_le_bytes());
    buf.extend_from_slice(&envelope.ciphertext);

    buf
}

/// Parse file bytes back into a sealed envelope plus the stored version.
pub fn read_file(data: &[u8]) -> Result<(u16, Envelope), CoreError> {
    if data.len() < MIN_HEADER_SIZE {
        return Err(CoreError::InvalidFileFormat(
            "File too small to be a valid GPFL file".into(),
        ));
    }

    if &data[0..4] != MAGIC {
        return Err(CoreError::InvalidFileFormat(
            "Invalid magic bytes, not a GPFL file".into(),
        ));
    }

    let mut offset = 4;

    let version = u16::from_le_bytes([data[offset], data[offset + 1]]);
    offset += 2;

    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let read_u32 = |field: &str, offset: &mut usize| -> Result<u32, CoreError> {
        let value = u32::from_le_bytes(
            data[*offset..*offset + 4]
                .try_into()
                .map_err(|_| CoreError::InvalidFileFormat(format!("Failed to read {field}")))?,
        );
        *offset += 4;
        Ok(value)
    };

    let memory_cost = read_u32("KDF memory_cost", &mut offset)?;
    let time_cost = read_u32("KDF time_cost", &mut offset)?;
    let parallelism = read_u32("KDF parallelism", &mut offset)?;

    // Bound the KDF params so a crafted file cannot demand absurd resources.
    // memory_cost: 8 KiB (Argon2 minimum) to 1 GiB; time_cost up to 20;
    // parallelism 1 to 16 threads.
    if !(8..=1_048_576).contains(&memory_cost) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF memory_cost out of safe range: {memory_cost} KiB (expected 8..1048576)"
        )));
    }
    if !(1..=20).contains(&time_cost) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF time_cost out of safe range: {time_cost} (expected 1..20)"
        )));
    }
    if !(1..=16).contains(&parallelism) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF parallelism out of safe range: {parallelism} (expected 1..16)"
        )));
    }

    let mut salt = [0u8; 16];
    salt.copy_from_slice(&data[offset..offset + 16]);
    offset += 16;

    let mut nonce = [0u8; 12];
    nonce.copy_from_slice(&data[offset..offset + 12]);
    offset += 12;

    let ciphertext_len = u64::from_le_bytes(
        data[offset..offset + 8]
            .try_into()
            .map_err(|_| CoreError::InvalidFileFormat("Failed to read ciphertext length".into()))?,
    );
    offset += 8;

    // Compare before casting: a crafted length field must not overflow.
    if ciphertext_len > (data.len() - offset) as u64 {
        return Err(CoreError::InvalidFileFormat(format!(
            "File truncated: expected {} bytes of ciphertext, got {}",
            ciphertext_len,
            data.len() - offset
        )));
    }
    let expected_end = offset + ciphertext_len as usize;

    let envelope = Envelope {
        kdf_params: KdfParams {
            memory_cost,
            time_cost,
            parallelism,
        },
        salt,
        nonce,
        ciphertext: data[offset..expected_end].to_vec(),
    };

    Ok((version, envelope))
}
