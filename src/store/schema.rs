pub const SCHEMA: &str = r#"
-- Cabinets are never hard-deleted; status = 'archived' hides them from listings
CREATE TABLE IF NOT EXISTS cabinets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    position INTEGER,
    status TEXT DEFAULT 'active',
    added_by TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT
);

-- Files belong to exactly one cabinet. The display locator C<cabinet_id>.<sequence>
-- is derived on read; only the sequence is stored.
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cabinet_id INTEGER NOT NULL REFERENCES cabinets(id),
    sequence INTEGER NOT NULL CHECK (sequence > 0),
    filename TEXT NOT NULL,
    description TEXT,
    category TEXT DEFAULT 'Documents',
    status TEXT DEFAULT 'available',
    added_by TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT,
    deleted_at TEXT,            -- NULL = live

    UNIQUE(cabinet_id, sequence)
);

-- Borrow/use log. Populated outside this service; read-only here.
CREATE TABLE IF NOT EXISTS file_uses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id INTEGER NOT NULL REFERENCES files(id),
    cabinet_id INTEGER NOT NULL REFERENCES cabinets(id),
    borrower TEXT,
    purpose TEXT,
    notes TEXT,
    borrowed_at TEXT,
    returned_at TEXT,
    added_by TEXT,
    created_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_cabinets_status ON cabinets(status);
CREATE INDEX IF NOT EXISTS idx_files_cabinet ON files(cabinet_id, deleted_at);
CREATE INDEX IF NOT EXISTS idx_files_created ON files(created_at);
CREATE INDEX IF NOT EXISTS idx_file_uses_cabinet ON file_uses(cabinet_id);
"#;
