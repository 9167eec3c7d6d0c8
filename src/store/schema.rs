//! Database schema definitions
//!
//! Four relations: the page table itself, an FTS5 index correlated to it by
//! rowid, the tag set, and the page<->tag association table.

/// SQL to create the page table.
/// A second insert with a colliding key is silently ignored (first write
/// wins); callers that need failure semantics must check afterwards.
pub const CREATE_PAGE_TABLE: &str = r#"
CREATE TABLE page (
    id INTEGER PRIMARY KEY,
    key TEXT UNIQUE ON CONFLICT IGNORE NOT NULL,
    html TEXT,
    json TEXT
)
"#;

/// SQL to create the full-text index. Its rowid is a page id; the stored
/// text is write-only and never read back out.
pub const CREATE_FTS_TABLE: &str = "CREATE VIRTUAL TABLE pagefts USING fts5(fulltext)";

/// SQL to create the tag table (insert-if-absent by name)
pub const CREATE_TAG_TABLE: &str = r#"
CREATE TABLE tag (
    id INTEGER PRIMARY KEY,
    name TEXT UNIQUE ON CONFLICT IGNORE NOT NULL
)
"#;

/// SQL to create the page<->tag association table. The UNIQUE pair makes
/// duplicate link requests idempotent. Link cleanup is done explicitly in
/// the deletion paths rather than through engine-side cascades.
pub const CREATE_TAGXREF_TABLE: &str = r#"
CREATE TABLE tagxref (
    tagid INTEGER NOT NULL,
    pageid INTEGER NOT NULL,
    UNIQUE(tagid, pageid) ON CONFLICT IGNORE,
    FOREIGN KEY(tagid) REFERENCES tag(id),
    FOREIGN KEY(pageid) REFERENCES page(id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX idx_tagxref_page ON tagxref(pageid)",
];

/// Drop statements for a full purge, in dependency order. Table-owned
/// indexes go away with their tables.
pub const DROP_STATEMENTS: &[&str] = &[
    "DROP TABLE IF EXISTS tagxref",
    "DROP TABLE IF EXISTS tag",
    "DROP TABLE IF EXISTS pagefts",
    "DROP TABLE IF EXISTS page",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_PAGE_TABLE,
        CREATE_FTS_TABLE,
        CREATE_TAG_TABLE,
        CREATE_TAGXREF_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
