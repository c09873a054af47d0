mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Cabinet operations
    fn create_cabinet(&self, cabinet: &NewCabinet) -> Result<i64>;
    fn get_cabinet(&self, id: i64) -> Result<Option<Cabinet>>;
    fn list_cabinets(&self, include_archived: bool) -> Result<Vec<Cabinet>>;
    /// Applies the changes and stamps `updated_at`. Returns false if no row matched.
    fn update_cabinet(&self, id: i64, changes: &CabinetChanges) -> Result<bool>;

    // File operations
    /// Allocates the next sequence for the cabinet and inserts the file atomically.
    /// Returns `Error::NotFound` if the cabinet does not exist.
    fn create_file(&self, file: &NewFile) -> Result<File>;
    fn get_file(&self, id: i64) -> Result<Option<FileWithCabinet>>;
    fn list_cabinet_files(&self, cabinet_id: i64, filter: &FileFilter) -> Result<Vec<File>>;
    /// Updates a live file. Returns false if no live row matched.
    fn update_file(&self, id: i64, changes: &FileChanges) -> Result<bool>;
    /// Soft-deletes a live file. Returns false if it is missing or already deleted.
    fn delete_file(&self, id: i64) -> Result<bool>;

    // File use operations
    fn list_cabinet_file_uses(&self, cabinet_id: i64) -> Result<Vec<FileUse>>;

    // Dashboard
    fn dashboard_stats(&self) -> Result<DashboardStats>;
}
