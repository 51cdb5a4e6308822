// ═══════════════════════════════════════════════════════════════════
// Storage Tests — encrypted portable format, tamper resistance,
// file repository, password change
// ═══════════════════════════════════════════════════════════════════

use groupfolio_core::errors::CoreError;
use groupfolio_core::models::group::Group;
use groupfolio_core::models::holding::{AssetClass, Holding};
use groupfolio_core::models::member::Member;
use groupfolio_core::storage::format::MIN_HEADER_SIZE;
use groupfolio_core::storage::manager::StorageManager;
use groupfolio_core::storage::repository::{EncryptedFileRepository, GroupRepository};
use groupfolio_core::GroupTracker;

fn sample_group() -> Group {
    let mut group = Group::new("Crew");
    let member = Member::new("Ala", 45, 2500.0);
    let member_id = member.id;
    group.members.push(member);
    group
        .holdings
        .push(Holding::new(member_id, "VWCE", "FTSE All-World", AssetClass::Etf, 10.0, 110.0));
    group
}

// ── Portable bytes ──────────────────────────────────────────────────

#[test]
fn save_and_load_bytes_roundtrip() {
    let group = sample_group();
    let bytes = StorageManager::save_to_bytes(&group, "hunter2").unwrap();
    assert_eq!(&bytes[0..4], b"GPFL");
    assert!(bytes.len() > MIN_HEADER_SIZE);

    let restored = StorageManager::load_from_bytes(&bytes, "hunter2").unwrap();
    assert_eq!(restored, group);
}

#[test]
fn wrong_password_is_rejected() {
    let bytes = StorageManager::save_to_bytes(&sample_group(), "correct").unwrap();
    let result = StorageManager::load_from_bytes(&bytes, "incorrect");
    assert!(matches!(result, Err(CoreError::Decryption)));
}

#[test]
fn tampered_ciphertext_fails_authentication() {
    let mut bytes = StorageManager::save_to_bytes(&sample_group(), "hunter2").unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    let result = StorageManager::load_from_bytes(&bytes, "hunter2");
    assert!(matches!(result, Err(CoreError::Decryption)));
}

#[test]
fn bad_magic_is_not_a_gpfl_file() {
    let mut bytes = StorageManager::save_to_bytes(&sample_group(), "hunter2").unwrap();
    bytes[0] = b'X';
    let result = StorageManager::load_from_bytes(&bytes, "hunter2");
    assert!(matches!(result, Err(CoreError::InvalidFileFormat(_))));
}

#[test]
fn future_version_is_unsupported() {
    let mut bytes = StorageManager::save_to_bytes(&sample_group(), "hunter2").unwrap();
    bytes[4] = 99;
    bytes[5] = 0;
    let result = StorageManager::load_from_bytes(&bytes, "hunter2");
    assert!(matches!(result, Err(CoreError::UnsupportedVersion(99))));
}

#[test]
fn truncated_file_is_rejected() {
    let bytes = StorageManager::save_to_bytes(&sample_group(), "hunter2").unwrap();

    // Shorter than any valid header.
    let result = StorageManager::load_from_bytes(&bytes[..10], "hunter2");
    assert!(matches!(result, Err(CoreError::InvalidFileFormat(_))));

    // Header intact but ciphertext cut short.
    let result = StorageManager::load_from_bytes(&bytes[..bytes.len() - 5], "hunter2");
    assert!(matches!(result, Err(CoreError::InvalidFileFormat(_))));
}

#[test]
fn oversized_length_field_is_rejected() {
    let mut bytes = StorageManager::save_to_bytes(&sample_group(), "hunter2").unwrap();
    // ciphertext_len sits at the end of the header: magic(4) + version(2)
    // + kdf_params(12) + salt(16) + nonce(12) = offset 46.
    bytes[46..54].copy_from_slice(&u64::MAX.to_le_bytes());
    let result = StorageManager::load_from_bytes(&bytes, "hunter2");
    assert!(matches!(result, Err(CoreError::InvalidFileFormat(_))));
}

#[test]
fn absurd_kdf_params_are_rejected() {
    let mut bytes = StorageManager::save_to_bytes(&sample_group(), "hunter2").unwrap();
    // memory_cost lives right after magic + version.
    bytes[6..10].copy_from_slice(&u32::MAX.to_le_bytes());
    let result = StorageManager::load_from_bytes(&bytes, "hunter2");
    assert!(matches!(result, Err(CoreError::InvalidFileFormat(_))));
}

#[test]
fn each_save_uses_fresh_salt_and_nonce() {
    let group = sample_group();
    let a = StorageManager::save_to_bytes(&group, "hunter2").unwrap();
    let b = StorageManager::save_to_bytes(&group, "hunter2").unwrap();
    // Same plaintext and password, but the wire bytes never repeat.
    assert_ne!(a, b);
}

// ── File repository ─────────────────────────────────────────────────

#[test]
fn file_repository_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = EncryptedFileRepository::new(dir.path(), "hunter2");

    let group = sample_group();
    repo.save(&group).unwrap();
    assert!(dir.path().join(format!("{}.gpfl", group.id)).exists());

    let restored = repo.load(group.id).unwrap();
    assert_eq!(restored, group);
}

#[test]
fn file_repository_missing_group_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let repo = EncryptedFileRepository::new(dir.path(), "hunter2");
    let result = repo.load(uuid::Uuid::new_v4());
    assert!(matches!(result, Err(CoreError::FileIO(_))));
}

#[test]
fn tracker_save_and_load_through_repository() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = EncryptedFileRepository::new(dir.path(), "hunter2");

    let mut tracker = GroupTracker::create_new("Crew");
    let member_id = tracker.add_member("Ala", 0, 1000.0, &[]).unwrap();
    assert!(tracker.has_unsaved_changes());

    tracker.save_with(&mut repo).unwrap();
    assert!(!tracker.has_unsaved_changes());

    let loaded = GroupTracker::load_with(&repo, tracker.group_id()).unwrap();
    assert!(!loaded.has_unsaved_changes());
    assert_eq!(loaded.member(member_id).unwrap().cash_balance, 1000.0);
}

// ── Password change ─────────────────────────────────────────────────

#[test]
fn change_password_verifies_current_and_reencrypts() {
    let mut tracker = GroupTracker::create_new("Crew");
    tracker.add_member("Ala", 0, 500.0, &[]).unwrap();
    let saved = tracker.save_to_bytes("old-pass").unwrap();

    let result = tracker.change_password(&saved, "wrong", "new-pass");
    assert!(matches!(result, Err(CoreError::Decryption)));

    let rekeyed = tracker.change_password(&saved, "old-pass", "new-pass").unwrap();
    assert!(StorageManager::load_from_bytes(&rekeyed, "old-pass").is_err());
    let restored = StorageManager::load_from_bytes(&rekeyed, "new-pass").unwrap();
    assert_eq!(restored.members.len(), 1);
}
