use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::group::Group;

use super::manager::StorageManager;

/// The persistence seam. The core never touches a storage mechanism
/// directly; the host injects a repository, so there is no ambient
/// global state and tests can swap in an in-memory implementation.
pub trait GroupRepository {
    /// Load a group by id.
    fn load(&self, group_id: Uuid) -> Result<Group, CoreError>;

    /// Persist a group, replacing any previous version.
    fn save(&mut self, group: &Group) -> Result<(), CoreError>;
}

/// A [`GroupRepository`] over a directory of encrypted `.gpfl` files,
/// one per group, named by group id. Native only.
#[cfg(not(target_arch = "wasm32"))]
pub struct EncryptedFileRepository {
    directory: std::path::PathBuf,
    password: String,
}

#[cfg(not(target_arch = "wasm32"))]
impl EncryptedFileRepository {
    pub fn new(directory: impl Into<std::path::PathBuf>, password: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            password: password.into(),
        }
    }

    fn path_for(&self, group_id: Uuid) -> std::path::PathBuf {
        self.directory.join(format!("{group_id}.gpfl"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl GroupRepository for EncryptedFileRepository {
    fn load(&self, group_id: Uuid) -> Result<Group, CoreError> {
        let path = self.path_for(group_id);
        let bytes = std::fs::read(&path)?;
        StorageManager::load_from_bytes(&bytes, &self.password)
    }

    fn save(&mut self, group: &Group) -> Result<(), CoreError> {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.path_for(group.id);
        let bytes = StorageManager::save_to_bytes(group, &self.password)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
