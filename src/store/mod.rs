//! SQLite-backed page store.
//!
//! [`PageStore`] is the single entry point: it owns one exclusive
//! connection, routes column shaping through
//! [`Projection`](crate::Projection), tag bookkeeping through the tag
//! graph, and text search through the FTS adapter.
//!
//! Writes accumulate in one session transaction. A dirty flag is set by
//! every mutating call and read once at release: `close` (or drop) commits
//! only if something actually changed.

pub mod schema;

mod fts;
mod tags;

use std::fmt;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use crate::config::{Durability, StoreConfig};
use crate::projection::{Projected, Projection};
use crate::{Error, Result};
use self::fts::TextIndex;
use self::tags::TagGraph;

/// A searchable page cache over one SQLite database.
///
/// Single-threaded, single-connection: one instance owns one exclusive
/// handle, and there is no internal locking. Callers sharing a backing
/// file must serialize access themselves.
pub struct PageStore {
    conn: Connection,
    dirty: bool,
}

impl PageStore {
    /// Open a database file (creates if it doesn't exist). The schema is
    /// not created here; call [`initialise`](Self::initialise) once on a
    /// fresh database.
    pub fn open(path: &Path, durability: Durability) -> Result<Self> {
        tracing::debug!(path = %path.display(), ?durability, "opening page store");
        let conn = Connection::open(path)?;
        Self::attach(conn, durability)
    }

    /// Open a fresh in-memory store with the schema already created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self::attach(conn, Durability::Relaxed)?;
        store.initialise()?;
        Ok(store)
    }

    /// Open per a [`StoreConfig`]: a database path, or in-memory when none
    /// is configured.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        match &config.database {
            Some(path) => {
                crate::config::ensure_db_dir(path)?;
                Self::open(path, config.durability)
            }
            None => Self::open_in_memory(),
        }
    }

    fn attach(conn: Connection, durability: Durability) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "synchronous", durability.synchronous_pragma())?;
        conn.execute_batch("BEGIN")?;
        Ok(Self { conn, dirty: false })
    }

    /// Create the four relations on a fresh database.
    ///
    /// Not idempotent: calling this on an already initialised database
    /// fails with [`Error::Storage`].
    pub fn initialise(&mut self) -> Result<()> {
        tracing::debug!("initialising new tables from schema");
        self.dirty = true;
        for stmt in schema::all_schema_statements() {
            self.exec(stmt, [])?;
        }
        Ok(())
    }

    /// Commit pending mutations (if any) and release the store. Dropping
    /// the store does the same best-effort; use `close` to observe commit
    /// errors.
    pub fn close(mut self) -> Result<()> {
        self.commit_if_dirty()
    }

    fn commit_if_dirty(&mut self) -> Result<()> {
        if self.dirty {
            tracing::debug!("committing changes to database");
            self.conn.execute_batch("COMMIT")?;
            self.dirty = false;
        }
        Ok(())
    }

    // ========== Mutations ==========

    /// Store a new page with its searchable text and tags.
    ///
    /// If `key` already exists the insert is silently ignored (first write
    /// wins) and neither the text index nor the tag links are touched;
    /// this call alone gives the caller no collision signal.
    pub fn store(
        &mut self,
        key: &str,
        html: Option<&str>,
        json: Option<&str>,
        fulltext: &str,
        tags: &[&str],
    ) -> Result<()> {
        tracing::debug!(key, "storing page");
        self.dirty = true;

        let changed = self.exec(
            "INSERT INTO page(key, html, json) VALUES (?1, ?2, ?3)",
            params![key, html, json],
        )?;
        if changed == 0 {
            tracing::debug!(key, "key already present, insert ignored");
            return Ok(());
        }

        let page_id = self.conn.last_insert_rowid();
        TextIndex::new(&self.conn).insert(page_id, fulltext)?;

        let graph = TagGraph::new(&self.conn);
        graph.ensure(tags)?;
        graph.link(page_id, tags)?;
        Ok(())
    }

    /// Update an already stored page, found by `old_key` when given, else
    /// by `key`. Updating the key this way is how a rename is done.
    ///
    /// Upsert semantics: if no such page exists this behaves exactly like
    /// [`store`](Self::store). Otherwise key/html/json are overwritten in
    /// place, the indexed text is replaced, and the tag associations are
    /// rebuilt from `tags` (tags no longer referenced stay in the tag
    /// table as orphans).
    pub fn update(
        &mut self,
        key: &str,
        html: Option<&str>,
        json: Option<&str>,
        fulltext: &str,
        tags: &[&str],
        old_key: Option<&str>,
    ) -> Result<()> {
        let lookup = old_key.unwrap_or(key);
        let Some(page_id) = self.page_id(lookup)? else {
            return self.store(key, html, json, fulltext, tags);
        };

        tracing::debug!(key, page_id, "updating page");
        self.dirty = true;

        self.exec(
            "UPDATE page SET key = ?1, html = ?2, json = ?3 WHERE id = ?4",
            params![key, html, json, page_id],
        )?;
        TextIndex::new(&self.conn).replace(page_id, fulltext)?;

        let graph = TagGraph::new(&self.conn);
        graph.ensure(tags)?;
        graph.unlink(page_id)?;
        graph.link(page_id, tags)?;
        Ok(())
    }

    /// Remove one page by key, including its tag associations and its text
    /// index entry. Unknown keys are a no-op.
    pub fn purge(&mut self, key: &str) -> Result<()> {
        let Some(page_id) = self.page_id(key)? else {
            return Ok(());
        };

        tracing::debug!(key, page_id, "purging page");
        self.dirty = true;

        TagGraph::new(&self.conn).unlink(page_id)?;
        TextIndex::new(&self.conn).remove(page_id)?;
        self.exec("DELETE FROM page WHERE id = ?1", [page_id])?;
        Ok(())
    }

    /// Drop and recreate the whole schema: a fresh, empty store.
    pub fn purge_all(&mut self) -> Result<()> {
        tracing::debug!("purging entire store");
        self.dirty = true;
        for stmt in schema::DROP_STATEMENTS {
            self.exec(stmt, [])?;
        }
        self.initialise()
    }

    // ========== Queries ==========

    /// Fetch one page by key. `None` when the key is absent.
    pub fn get_by_key(&self, key: &str, projection: &Projection) -> Result<Option<Projected>> {
        let sql = format!("SELECT {} FROM page WHERE key = ?1", projection.column_list());
        let row = self
            .conn
            .query_row(&sql, [key], |row| projection.read_row(row))
            .optional()?;
        Ok(row)
    }

    /// All pages, in id order. `None` limit means every page.
    pub fn all_pages(&self, projection: &Projection, limit: Option<usize>) -> Result<Vec<Projected>> {
        let sql = format!(
            "SELECT {} FROM page ORDER BY id LIMIT ?1",
            projection.column_list()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([sql_limit(limit)], |row| projection.read_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Full-text search. The match syntax is the engine's (FTS5); a blank
    /// term returns nothing regardless of store contents.
    pub fn search(
        &self,
        term: &str,
        projection: &Projection,
        limit: Option<usize>,
    ) -> Result<Vec<Projected>> {
        let ids = TextIndex::new(&self.conn).search(term, limit)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.pages_by_ids(&ids, projection)
    }

    /// Pages carrying the given tag, in id order.
    pub fn get_by_tag(&self, tag: &str, projection: &Projection) -> Result<Vec<Projected>> {
        self.get_by_tags(&[tag], projection, &[])
    }

    /// Pages carrying *any* of `tags` and none of `exclude`, in id order.
    /// An empty `tags` list matches nothing.
    pub fn get_by_tags(
        &self,
        tags: &[&str],
        projection: &Projection,
        exclude: &[&str],
    ) -> Result<Vec<Projected>> {
        let ids = TagGraph::new(&self.conn).pages_with_any_of(tags, exclude)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.pages_by_ids(&ids, projection)
    }

    /// Tag names of one page, unspecified order. Empty for unknown keys.
    pub fn tags_of_page(&self, key: &str) -> Result<Vec<String>> {
        let Some(page_id) = self.page_id(key)? else {
            return Ok(Vec::new());
        };
        TagGraph::new(&self.conn).names_of(page_id)
    }

    /// Every tag name in the store, including orphans.
    pub fn all_tags(&self) -> Result<Vec<String>> {
        TagGraph::new(&self.conn).all_names()
    }

    /// Count all pages
    pub fn count_pages(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM page", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get store statistics
    pub fn stats(&self) -> Result<StoreStats> {
        let graph = TagGraph::new(&self.conn);
        Ok(StoreStats {
            pages: self.count_pages()?,
            tags: graph.count()?,
            links: graph.link_count()?,
            indexed: TextIndex::new(&self.conn).count()?,
        })
    }

    // ========== Helpers ==========

    fn page_id(&self, key: &str) -> Result<Option<i64>> {
        self.conn
            .query_row("SELECT id FROM page WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .map_err(Into::into)
    }

    fn pages_by_ids(&self, ids: &[i64], projection: &Projection) -> Result<Vec<Projected>> {
        let sql = format!(
            "SELECT {} FROM page WHERE id IN ({}) ORDER BY id",
            projection.column_list(),
            placeholders(ids.len()),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(ids.iter().copied()), |row| {
                projection.read_row(row)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Run a statement, logging the failing SQL before propagating errors.
    fn exec(&self, sql: &str, params: impl rusqlite::Params) -> Result<usize> {
        self.conn.execute(sql, params).map_err(|e| {
            tracing::error!(sql, error = %e, "SQL error in query");
            Error::from(e)
        })
    }
}

impl Drop for PageStore {
    fn drop(&mut self) {
        if self.dirty {
            if let Err(e) = self.conn.execute_batch("COMMIT") {
                tracing::error!(error = %e, "failed to commit page store on release");
            }
        }
    }
}

/// `?, ?, ...` for one placeholder per element of an IN list. Values are
/// always bound; only the placeholder count is generated.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

/// SQLite treats a negative LIMIT as "no limit", which keeps `None`
/// distinct from `Some(0)`.
pub(crate) fn sql_limit(limit: Option<usize>) -> i64 {
    match limit {
        Some(n) => n as i64,
        None => -1,
    }
}

/// Store statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub pages: usize,
    pub tags: usize,
    pub links: usize,
    pub indexed: usize,
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Store Statistics:")?;
        writeln!(f, "  Pages: {}", self.pages)?;
        writeln!(f, "  Tags: {}", self.tags)?;
        writeln!(f, "  Tag links: {}", self.links)?;
        writeln!(f, "  Indexed: {}", self.indexed)
    }
}
