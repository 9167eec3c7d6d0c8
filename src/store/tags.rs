//! Tag bookkeeping: the tag set and the page<->tag association table.
//!
//! Tags are created on first reference and never deleted; a tag that no
//! page references any more simply stays in the table. Associations are
//! cleaned up explicitly by the page-deletion path.

use rusqlite::Connection;
use rusqlite::params_from_iter;
use rusqlite::types::Value as SqlValue;

use super::placeholders;
use crate::Result;

pub(crate) struct TagGraph<'conn> {
    conn: &'conn Connection,
}

impl<'conn> TagGraph<'conn> {
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Create any tags not already present. Existing names are a no-op.
    pub(crate) fn ensure(&self, names: &[&str]) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare("INSERT OR IGNORE INTO tag(name) VALUES (?1)")?;
        for name in names {
            stmt.execute([name])?;
        }
        Ok(())
    }

    /// Link a page to each named tag. Tags must already exist (see
    /// [`ensure`](Self::ensure)); re-linking an existing pair is a no-op.
    pub(crate) fn link(&self, page_id: i64, names: &[&str]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "INSERT OR IGNORE INTO tagxref(tagid, pageid) \
             SELECT id, ? FROM tag WHERE name IN ({})",
            placeholders(names.len()),
        );
        let mut params: Vec<SqlValue> = Vec::with_capacity(names.len() + 1);
        params.push(SqlValue::Integer(page_id));
        params.extend(names.iter().map(|name| SqlValue::Text((*name).to_string())));

        self.conn.execute(&sql, params_from_iter(params))?;
        Ok(())
    }

    /// Remove every association the page has.
    pub(crate) fn unlink(&self, page_id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM tagxref WHERE pageid = ?1", [page_id])?;
        Ok(())
    }

    /// Tag names associated with a page, in no particular order.
    pub(crate) fn names_of(&self, page_id: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT tag.name FROM tag \
             JOIN tagxref ON tagxref.tagid = tag.id \
             WHERE tagxref.pageid = ?1",
        )?;
        let names = stmt
            .query_map([page_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Ids of pages carrying at least one `include` tag and none of the
    /// `exclude` tags. An empty `include` list matches nothing.
    pub(crate) fn pages_with_any_of(&self, include: &[&str], exclude: &[&str]) -> Result<Vec<i64>> {
        if include.is_empty() {
            return Ok(Vec::new());
        }

        // SQLite accepts an empty IN () list, so no special case for an
        // empty exclude set.
        let sql = format!(
            "SELECT DISTINCT x.pageid FROM tag t \
             JOIN tagxref x ON x.tagid = t.id \
             WHERE t.name IN ({}) \
               AND x.pageid NOT IN ( \
                 SELECT x2.pageid FROM tag t2 \
                 JOIN tagxref x2 ON x2.tagid = t2.id \
                 WHERE t2.name IN ({})) \
             ORDER BY x.pageid",
            placeholders(include.len()),
            placeholders(exclude.len()),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(
                params_from_iter(include.iter().chain(exclude.iter()).copied()),
                |row| row.get(0),
            )?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    /// Every tag name in the store, including ones no page references.
    pub(crate) fn all_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM tag")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    pub(crate) fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tag", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub(crate) fn link_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tagxref", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
