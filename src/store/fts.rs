//! Full-text index adapter.
//!
//! A thin view over the `pagefts` FTS5 table, correlated to `page.id` by
//! rowid. The index is write-only: searching returns matching page ids,
//! never the indexed text.

use rusqlite::{Connection, params};

use super::sql_limit;
use crate::Result;

pub(crate) struct TextIndex<'conn> {
    conn: &'conn Connection,
}

impl<'conn> TextIndex<'conn> {
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Index searchable text for a newly stored page.
    pub(crate) fn insert(&self, page_id: i64, text: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO pagefts(rowid, fulltext) VALUES (?1, ?2)",
            params![page_id, text],
        )?;
        Ok(())
    }

    /// Overwrite the indexed text for an existing page.
    pub(crate) fn replace(&self, page_id: i64, text: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE pagefts SET fulltext = ?1 WHERE rowid = ?2",
            params![text, page_id],
        )?;
        Ok(())
    }

    /// Drop the index entry for a page.
    pub(crate) fn remove(&self, page_id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM pagefts WHERE rowid = ?1", [page_id])?;
        Ok(())
    }

    /// Page ids whose indexed text matches `term`, under FTS5 match syntax
    /// (so `term` may carry prefix `*`, NEAR, etc.). A blank term matches
    /// nothing. `None` means no limit; `Some(0)` means zero rows.
    pub(crate) fn search(&self, term: &str, limit: Option<usize>) -> Result<Vec<i64>> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self
            .conn
            .prepare("SELECT rowid FROM pagefts WHERE pagefts MATCH ?1 LIMIT ?2")?;
        let ids = stmt
            .query_map(params![term, sql_limit(limit)], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    pub(crate) fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pagefts", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
