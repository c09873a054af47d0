use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CabinetStatus, Category, FileStatus};

/// Formats the human-readable locator of a file, e.g. `C3.12`.
#[must_use]
pub fn cabinet_number(cabinet_id: i64, sequence: i64) -> String {
    format!("C{cabinet_id}.{sequence}")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cabinet {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub position: Option<i64>,
    pub status: CabinetStatus,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Live (not soft-deleted) files in this cabinet, counted at read time.
    pub file_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewCabinet {
    pub name: String,
    pub description: Option<String>,
    pub position: Option<i64>,
    pub status: CabinetStatus,
    pub added_by: String,
}

/// Partial cabinet update. `None` leaves a column untouched;
/// `description: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct CabinetChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub position: Option<i64>,
    pub status: Option<CabinetStatus>,
}

impl CabinetChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.position.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub id: i64,
    pub cabinet_id: i64,
    #[serde(skip)]
    pub sequence: i64,
    pub cabinet_number: String,
    pub filename: String,
    pub description: Option<String>,
    pub category: Category,
    pub status: FileStatus,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileWithCabinet {
    #[serde(flatten)]
    pub file: File,
    pub cabinet_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewFile {
    pub cabinet_id: i64,
    pub filename: String,
    pub description: Option<String>,
    pub category: Category,
    pub status: FileStatus,
    pub added_by: String,
}

#[derive(Debug, Clone, Default)]
pub struct FileChanges {
    pub filename: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Category>,
    pub status: Option<FileStatus>,
}

impl FileChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filename.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    /// Case-insensitive substring matched against the cabinet number or filename.
    pub search: Option<String>,
    pub status: Option<FileStatus>,
}

/// A borrow/use record joined with the file and cabinet it refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileUse {
    pub id: i64,
    pub file_id: i64,
    pub cabinet_id: i64,
    pub borrower: Option<String>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub borrowed_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub added_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub filename: Option<String>,
    pub cabinet_number: Option<String>,
    pub cabinet_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub available: i64,
    pub borrowed: i64,
    pub archived: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: FileStatus, count: i64) {
        match status {
            FileStatus::Available => self.available += count,
            FileStatus::Borrowed => self.borrowed += count,
            FileStatus::Archived => self.archived += count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    #[serde(rename = "Documents")]
    pub documents: i64,
    #[serde(rename = "Sports")]
    pub sports: i64,
    #[serde(rename = "Objects")]
    pub objects: i64,
}

impl CategoryCounts {
    pub fn add(&mut self, category: Category, count: i64) {
        match category {
            Category::Documents => self.documents += count,
            Category::Sports => self.sports += count,
            Category::Objects => self.objects += count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_files: i64,
    pub total_cabinets: i64,
    pub pending_cabinets: i64,
    pub files_by_status: StatusCounts,
    pub files_by_category: CategoryCounts,
    /// Files that are soft-deleted or shelved. Overlaps `files_by_status.archived`.
    pub archived_files: i64,
    pub recent_files: Vec<File>,
}
