//! Canonical SQLite schema for sheetrack.
//!
//! - `sheets`, `topics`, `sub_patterns`, `problems` hold the catalog; every
//!   level below the sheet carries `sort_order` within its parent and an
//!   `is_deleted` soft-delete flag (rows are never hard-deleted)
//! - `users` keeps the profile aggregate's scalar fields, `completions`
//!   its problem → first-solve-instant map (a row exists only while solved)
//! - `notes` is the per-(user, problem) annotation collaborator
//! - `store_meta` tracks the schema version

/// Migration v1: catalog, profile and note tables plus store metadata.
pub const MIGRATION_V1_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS sheets (
    sheet_id TEXT PRIMARY KEY,
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    description TEXT NOT NULL DEFAULT '',
    is_deleted INTEGER NOT NULL DEFAULT 0 CHECK (is_deleted IN (0, 1)),
    created_at_us INTEGER NOT NULL,
    CHECK (sheet_id LIKE 'sh-%')
);

CREATE TABLE IF NOT EXISTS topics (
    topic_id TEXT PRIMARY KEY,
    sheet_id TEXT NOT NULL REFERENCES sheets(sheet_id),
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    sort_order INTEGER NOT NULL CHECK (sort_order > 0),
    is_deleted INTEGER NOT NULL DEFAULT 0 CHECK (is_deleted IN (0, 1)),
    CHECK (topic_id LIKE 'tp-%')
);

CREATE TABLE IF NOT EXISTS sub_patterns (
    sub_pattern_id TEXT PRIMARY KEY,
    topic_id TEXT NOT NULL REFERENCES topics(topic_id),
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    sort_order INTEGER NOT NULL CHECK (sort_order > 0),
    is_deleted INTEGER NOT NULL DEFAULT 0 CHECK (is_deleted IN (0, 1)),
    CHECK (sub_pattern_id LIKE 'sp-%')
);

CREATE TABLE IF NOT EXISTS problems (
    problem_id TEXT PRIMARY KEY,
    sub_pattern_id TEXT NOT NULL REFERENCES sub_patterns(sub_pattern_id),
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    url TEXT NOT NULL,
    platform TEXT NOT NULL CHECK (platform IN ('LeetCode', 'GFG', 'Other')),
    platform_id TEXT,
    sort_order INTEGER NOT NULL CHECK (sort_order > 0),
    is_deleted INTEGER NOT NULL DEFAULT 0 CHECK (is_deleted IN (0, 1)),
    CHECK (problem_id LIKE 'pb-%')
);

CREATE TABLE IF NOT EXISTS users (
    uid TEXT PRIMARY KEY CHECK (length(trim(uid)) > 0),
    email TEXT,
    display_name TEXT,
    role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('admin', 'user')),
    created_at_us INTEGER NOT NULL,
    last_active_us INTEGER NOT NULL,
    last_solved_date TEXT,
    current_streak INTEGER NOT NULL DEFAULT 0 CHECK (current_streak >= 0),
    max_streak INTEGER NOT NULL DEFAULT 0 CHECK (max_streak >= 0),
    CHECK (current_streak <= max_streak)
);

CREATE TABLE IF NOT EXISTS completions (
    uid TEXT NOT NULL REFERENCES users(uid) ON DELETE CASCADE,
    problem_id TEXT NOT NULL,
    solved_at_us INTEGER NOT NULL,
    PRIMARY KEY (uid, problem_id)
);

CREATE TABLE IF NOT EXISTS notes (
    uid TEXT NOT NULL,
    problem_id TEXT NOT NULL,
    content TEXT NOT NULL,
    updated_at_us INTEGER NOT NULL,
    PRIMARY KEY (uid, problem_id)
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 1);
"#;

/// Migration v2: read-path indexes for sibling listings and oversight views.
pub const MIGRATION_V2_SQL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_sheets_deleted_created
    ON sheets(is_deleted, created_at_us DESC);

CREATE INDEX IF NOT EXISTS idx_topics_sheet_order
    ON topics(sheet_id, is_deleted, sort_order);

CREATE INDEX IF NOT EXISTS idx_sub_patterns_topic_order
    ON sub_patterns(topic_id, is_deleted, sort_order);

CREATE INDEX IF NOT EXISTS idx_problems_sub_pattern_order
    ON problems(sub_pattern_id, is_deleted, sort_order);

CREATE INDEX IF NOT EXISTS idx_users_last_active
    ON users(last_active_us DESC);

CREATE INDEX IF NOT EXISTS idx_notes_uid
    ON notes(uid, problem_id);

UPDATE store_meta
SET schema_version = 2
WHERE id = 1;
"#;

/// Indexes expected by listing and aggregation query paths.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_sheets_deleted_created",
    "idx_topics_sheet_order",
    "idx_sub_patterns_topic_order",
    "idx_problems_sub_pattern_order",
    "idx_users_last_active",
    "idx_notes_uid",
];
