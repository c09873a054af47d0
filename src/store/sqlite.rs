use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, ToSql, TransactionBehavior, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const RECENT_FILES_LIMIT: i64 = 4;

const CABINET_SELECT: &str = "SELECT c.id, c.name, c.description, c.position, c.status, c.added_by,
            c.created_at, c.updated_at,
            (SELECT COUNT(*) FROM files f WHERE f.cabinet_id = c.id AND f.deleted_at IS NULL)
     FROM cabinets c";

const FILE_COLUMNS: &str = "f.id, f.cabinet_id, f.sequence, f.filename, f.description, f.category,
            f.status, f.added_by, f.created_at, f.updated_at, f.deleted_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL, such as
    /// populating `file_uses`, which has no write path here.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn parse_optional_datetime(s: Option<String>) -> Option<DateTime<Utc>> {
    s.map(|s| parse_datetime(&s))
}

/// Fixed-width RFC 3339 so that text ordering matches chronological ordering.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Builds a LIKE pattern matching `search` anywhere, with wildcards in the input escaped.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn cabinet_from_row(row: &Row<'_>) -> rusqlite::Result<Cabinet> {
    Ok(Cabinet {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        position: row.get(3)?,
        status: CabinetStatus::from_stored(row.get::<_, Option<String>>(4)?.as_deref()),
        added_by: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
        updated_at: parse_optional_datetime(row.get(7)?),
        file_count: row.get(8)?,
    })
}

fn file_from_row(row: &Row<'_>) -> rusqlite::Result<File> {
    let cabinet_id: i64 = row.get(1)?;
    let sequence: i64 = row.get(2)?;
    Ok(File {
        id: row.get(0)?,
        cabinet_id,
        sequence,
        cabinet_number: cabinet_number(cabinet_id, sequence),
        filename: row.get(3)?,
        description: row.get(4)?,
        category: Category::from_stored(row.get::<_, Option<String>>(5)?.as_deref()),
        status: FileStatus::from_stored(row.get::<_, Option<String>>(6)?.as_deref()),
        added_by: row.get(7)?,
        created_at: parse_datetime(&row.get::<_, String>(8)?),
        updated_at: parse_optional_datetime(row.get(9)?),
        deleted_at: parse_optional_datetime(row.get(10)?),
    })
}

fn file_use_from_row(row: &Row<'_>) -> rusqlite::Result<FileUse> {
    let file_cabinet_id: Option<i64> = row.get(11)?;
    let sequence: Option<i64> = row.get(12)?;
    Ok(FileUse {
        id: row.get(0)?,
        file_id: row.get(1)?,
        cabinet_id: row.get(2)?,
        borrower: row.get(3)?,
        purpose: row.get(4)?,
        notes: row.get(5)?,
        borrowed_at: parse_optional_datetime(row.get(6)?),
        returned_at: parse_optional_datetime(row.get(7)?),
        added_by: row.get(8)?,
        created_at: parse_datetime(&row.get::<_, String>(9)?),
        filename: row.get(10)?,
        cabinet_number: file_cabinet_id.zip(sequence).map(|(c, s)| cabinet_number(c, s)),
        cabinet_name: row.get(13)?,
    })
}

fn count(conn: &Connection, sql: &str) -> Result<i64> {
    conn.query_row(sql, [], |row| row.get(0))
        .map_err(Error::from)
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Cabinet operations

    fn create_cabinet(&self, cabinet: &NewCabinet) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO cabinets (name, description, position, status, added_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                cabinet.name,
                cabinet.description,
                cabinet.position,
                cabinet.status,
                cabinet.added_by,
                format_datetime(&Utc::now()),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_cabinet(&self, id: i64) -> Result<Option<Cabinet>> {
        let conn = self.conn();
        conn.query_row(
            &format!("{CABINET_SELECT} WHERE c.id = ?1"),
            params![id],
            cabinet_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_cabinets(&self, include_archived: bool) -> Result<Vec<Cabinet>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{CABINET_SELECT}
             WHERE ?1 OR c.status IS NULL OR c.status != 'archived'
             ORDER BY c.position ASC, c.created_at ASC, c.id ASC"
        ))?;

        let rows = stmt.query_map(params![include_archived], cabinet_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_cabinet(&self, id: i64, changes: &CabinetChanges) -> Result<bool> {
        let now = format_datetime(&Utc::now());
        let mut assignments = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(name) = &changes.name {
            assignments.push("name = ?");
            values.push(name);
        }
        if let Some(description) = &changes.description {
            assignments.push("description = ?");
            values.push(description);
        }
        if let Some(position) = &changes.position {
            assignments.push("position = ?");
            values.push(position);
        }
        if let Some(status) = &changes.status {
            assignments.push("status = ?");
            values.push(status);
        }
        assignments.push("updated_at = ?");
        values.push(&now);
        values.push(&id);

        let sql = format!(
            "UPDATE cabinets SET {} WHERE id = ?",
            assignments.join(", ")
        );
        let rows = self.conn().execute(&sql, values.as_slice())?;
        Ok(rows > 0)
    }

    // File operations

    fn create_file(&self, file: &NewFile) -> Result<File> {
        let mut conn = self.conn();
        // IMMEDIATE takes the write lock up front, so no other connection can
        // allocate from the same MAX(sequence) before this insert commits.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM cabinets WHERE id = ?1)",
            params![file.cabinet_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(Error::NotFound);
        }

        // Soft-deleted rows are included so numbers are never handed out twice.
        let sequence: i64 = tx.query_row(
            "SELECT COALESCE(MAX(sequence), 0) + 1 FROM files WHERE cabinet_id = ?1",
            params![file.cabinet_id],
            |row| row.get(0),
        )?;

        let result = tx.execute(
            "INSERT INTO files (cabinet_id, sequence, filename, description, category, status, added_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                file.cabinet_id,
                sequence,
                file.filename,
                file.description,
                file.category,
                file.status,
                file.added_by,
                format_datetime(&Utc::now()),
            ],
        );

        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(Error::Conflict(format!(
                    "cabinet number {} already allocated",
                    cabinet_number(file.cabinet_id, sequence)
                )));
            }
            Err(e) => return Err(Error::from(e)),
        }

        let id = tx.last_insert_rowid();
        let created = tx.query_row(
            &format!("SELECT {FILE_COLUMNS} FROM files f WHERE f.id = ?1"),
            params![id],
            file_from_row,
        )?;
        tx.commit()?;

        Ok(created)
    }

    fn get_file(&self, id: i64) -> Result<Option<FileWithCabinet>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {FILE_COLUMNS}, c.name
                 FROM files f LEFT JOIN cabinets c ON c.id = f.cabinet_id
                 WHERE f.id = ?1 AND f.deleted_at IS NULL"
            ),
            params![id],
            |row| {
                Ok(FileWithCabinet {
                    file: file_from_row(row)?,
                    cabinet_name: row.get(11)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_cabinet_files(&self, cabinet_id: i64, filter: &FileFilter) -> Result<Vec<File>> {
        let search = filter.search.as_deref().map(like_pattern);
        let mut sql = format!(
            "SELECT {FILE_COLUMNS} FROM files f
             WHERE f.cabinet_id = :cabinet_id AND f.deleted_at IS NULL"
        );
        let mut values: Vec<(&str, &dyn ToSql)> = Vec::new();
        values.push((":cabinet_id", &cabinet_id as &dyn ToSql));

        if let Some(pattern) = &search {
            sql.push_str(
                " AND (('C' || f.cabinet_id || '.' || f.sequence) LIKE :search ESCAPE '\\'
                       OR f.filename LIKE :search ESCAPE '\\')",
            );
            values.push((":search", pattern as &dyn ToSql));
        }
        if let Some(status) = &filter.status {
            sql.push_str(" AND COALESCE(NULLIF(f.status, ''), 'available') = :status");
            values.push((":status", status as &dyn ToSql));
        }
        sql.push_str(" ORDER BY f.sequence ASC");

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(values.as_slice(), file_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_file(&self, id: i64, changes: &FileChanges) -> Result<bool> {
        let now = format_datetime(&Utc::now());
        let mut assignments = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(filename) = &changes.filename {
            assignments.push("filename = ?");
            values.push(filename);
        }
        if let Some(description) = &changes.description {
            assignments.push("description = ?");
            values.push(description);
        }
        if let Some(category) = &changes.category {
            assignments.push("category = ?");
            values.push(category);
        }
        if let Some(status) = &changes.status {
            assignments.push("status = ?");
            values.push(status);
        }
        assignments.push("updated_at = ?");
        values.push(&now);
        values.push(&id);

        let sql = format!(
            "UPDATE files SET {} WHERE id = ? AND deleted_at IS NULL",
            assignments.join(", ")
        );
        let rows = self.conn().execute(&sql, values.as_slice())?;
        Ok(rows > 0)
    }

    fn delete_file(&self, id: i64) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE files SET deleted_at = ?1, updated_at = ?1, status = 'archived'
             WHERE id = ?2 AND deleted_at IS NULL",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(rows > 0)
    }

    // File use operations

    fn list_cabinet_file_uses(&self, cabinet_id: i64) -> Result<Vec<FileUse>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT u.id, u.file_id, u.cabinet_id, u.borrower, u.purpose, u.notes,
                    u.borrowed_at, u.returned_at, u.added_by, u.created_at,
                    f.filename, f.cabinet_id, f.sequence, c.name
             FROM file_uses u
             LEFT JOIN files f ON f.id = u.file_id
             LEFT JOIN cabinets c ON c.id = u.cabinet_id
             WHERE u.cabinet_id = ?1 AND u.deleted_at IS NULL
             ORDER BY u.created_at DESC, u.id DESC",
        )?;

        let rows = stmt.query_map(params![cabinet_id], file_use_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Dashboard

    fn dashboard_stats(&self) -> Result<DashboardStats> {
        let conn = self.conn();

        let total_files = count(&conn, "SELECT COUNT(*) FROM files WHERE deleted_at IS NULL")?;
        let total_cabinets = count(
            &conn,
            "SELECT COUNT(*) FROM cabinets WHERE status IS NULL OR status != 'archived'",
        )?;
        let pending_cabinets = count(
            &conn,
            "SELECT COUNT(*) FROM cabinets WHERE status = 'pending'",
        )?;
        let archived_files = count(
            &conn,
            "SELECT COUNT(*) FROM files WHERE deleted_at IS NOT NULL OR status = 'archived'",
        )?;

        let mut files_by_status = StatusCounts::default();
        {
            let mut stmt = conn.prepare(
                "SELECT status, COUNT(*) FROM files WHERE deleted_at IS NULL GROUP BY status",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (status, n) = row?;
                files_by_status.add(FileStatus::from_stored(status.as_deref()), n);
            }
        }

        let mut files_by_category = CategoryCounts::default();
        {
            let mut stmt = conn.prepare(
                "SELECT category, COUNT(*) FROM files WHERE deleted_at IS NULL GROUP BY category",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (category, n) = row?;
                files_by_category.add(Category::from_stored(category.as_deref()), n);
            }
        }

        let recent_files = {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FILE_COLUMNS} FROM files f
                 WHERE f.deleted_at IS NULL
                 ORDER BY f.created_at DESC, f.id DESC
                 LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![RECENT_FILES_LIMIT], file_from_row)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        Ok(DashboardStats {
            total_files,
            total_cabinets,
            pending_cabinets,
            files_by_status,
            files_by_category,
            archived_files,
            recent_files,
        })
    }
}
