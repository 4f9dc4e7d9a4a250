use std::fmt;
use std::path::Path;

use rusqlite::{Connection, params};

use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Ncbi,
    Uniprot,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Ncbi => "ncbi",
            Source::Uniprot => "uniprot",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRecord {
    pub source_id: Option<String>,
    pub fasta: String,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS fastas_todo (
    name TEXT NOT NULL,
    source_type TEXT NOT NULL,
    source_id TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS fastas_done (
    name TEXT NOT NULL,
    source_type TEXT NOT NULL,
    source_id TEXT,
    fasta TEXT NOT NULL
);
";

/// Local relational store of pending ids (`fastas_todo`) and fetched records
/// (`fastas_done`). Owns the single long-lived connection; every mutation
/// runs inside one transaction.
pub struct FastaStore {
    conn: Connection,
}

impl FastaStore {
    pub fn open(path: &Path) -> Result<Self, SyncError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, SyncError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn pending_ids(&self, query: &str, source: Source) -> Result<Vec<String>, SyncError> {
        let mut stmt = self
            .conn
            .prepare("SELECT source_id FROM fastas_todo WHERE name = ?1 AND source_type = ?2 ORDER BY rowid")?;
        let rows = stmt.query_map(params![query, source.as_str()], |row| {
            row.get::<_, String>(0)
        })?;

        let mut ids = Vec::new();
        for id in rows {
            ids.push(id?);
        }
        Ok(ids)
    }

    pub fn pending_count(&self, query: &str, source: Source) -> Result<usize, SyncError> {
        let count: i64 = self.conn.query_row(
            "SELECT count(*) FROM fastas_todo WHERE name = ?1 AND source_type = ?2",
            params![query, source.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn completed(&self, query: &str, source: Source) -> Result<Vec<CompletedRecord>, SyncError> {
        let mut stmt = self.conn.prepare(
            "SELECT source_id, fasta FROM fastas_done WHERE name = ?1 AND source_type = ?2 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![query, source.as_str()], |row| {
            Ok(CompletedRecord {
                source_id: row.get(0)?,
                fasta: row.get(1)?,
            })
        })?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }

    pub fn completed_count(&self, query: &str, source: Source) -> Result<usize, SyncError> {
        let count: i64 = self.conn.query_row(
            "SELECT count(*) FROM fastas_done WHERE name = ?1 AND source_type = ?2",
            params![query, source.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Atomically replaces the pending id set for (query, source): old rows
    /// are dropped and the fresh ids inserted in one transaction, so stale
    /// ids never linger and a failed insert leaves the old set intact.
    pub fn replace_pending(
        &mut self,
        query: &str,
        source: Source,
        ids: &[String],
    ) -> Result<(), SyncError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM fastas_todo WHERE name = ?1 AND source_type = ?2",
            params![query, source.as_str()],
        )?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO fastas_todo (name, source_type, source_id) VALUES (?1, ?2, ?3)",
            )?;
            for id in ids {
                insert.execute(params![query, source.as_str(), id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Persists one fetched chunk in a single transaction: superseded
    /// completed rows and the now-fetched pending rows are deleted, then each
    /// id is inserted with its record. `ids` and `fastas` pair positionally.
    /// The transaction rolls back on drop if any step fails.
    pub fn commit_chunk(
        &mut self,
        query: &str,
        source: Source,
        ids: &[String],
        fastas: &[String],
    ) -> Result<(), SyncError> {
        let tx = self.conn.transaction()?;
        {
            let mut delete_done = tx.prepare(
                "DELETE FROM fastas_done WHERE name = ?1 AND source_type = ?2 AND source_id = ?3",
            )?;
            let mut delete_todo = tx.prepare(
                "DELETE FROM fastas_todo WHERE name = ?1 AND source_type = ?2 AND source_id = ?3",
            )?;
            let mut insert = tx.prepare(
                "INSERT INTO fastas_done (name, source_type, source_id, fasta) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (id, fasta) in ids.iter().zip(fastas) {
                delete_done.execute(params![query, source.as_str(), id])?;
                delete_todo.execute(params![query, source.as_str(), id])?;
                insert.execute(params![query, source.as_str(), id, fasta])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Atomically replaces the completed record set for (query, source) with
    /// records that carry no per-record id (the uniprot path).
    pub fn replace_completed(
        &mut self,
        query: &str,
        source: Source,
        fastas: &[String],
    ) -> Result<(), SyncError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM fastas_done WHERE name = ?1 AND source_type = ?2",
            params![query, source.as_str()],
        )?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO fastas_done (name, source_type, source_id, fasta) VALUES (?1, ?2, NULL, ?3)",
            )?;
            for fasta in fastas {
                insert.execute(params![query, source.as_str(), fasta])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn replace_pending_drops_stale_rows() {
        let mut store = FastaStore::open_in_memory().unwrap();
        store
            .replace_pending("groel", Source::Ncbi, &ids(&["1", "2", "3"]))
            .unwrap();
        store
            .replace_pending("groel", Source::Ncbi, &ids(&["3", "4"]))
            .unwrap();

        assert_eq!(store.pending_ids("groel", Source::Ncbi).unwrap(), ids(&["3", "4"]));
    }

    #[test]
    fn replace_pending_scoped_to_query_and_source() {
        let mut store = FastaStore::open_in_memory().unwrap();
        store
            .replace_pending("groel", Source::Ncbi, &ids(&["1"]))
            .unwrap();
        store
            .replace_pending("groes", Source::Ncbi, &ids(&["2"]))
            .unwrap();

        assert_eq!(store.pending_count("groel", Source::Ncbi).unwrap(), 1);
        assert_eq!(store.pending_count("groes", Source::Ncbi).unwrap(), 1);
    }

    #[test]
    fn commit_chunk_moves_ids_from_pending_to_completed() {
        let mut store = FastaStore::open_in_memory().unwrap();
        store
            .replace_pending("groel", Source::Ncbi, &ids(&["1", "2"]))
            .unwrap();
        store
            .commit_chunk(
                "groel",
                Source::Ncbi,
                &ids(&["1", "2"]),
                &ids(&[">1\nAAA", ">2\nCCC"]),
            )
            .unwrap();

        assert_eq!(store.pending_count("groel", Source::Ncbi).unwrap(), 0);
        let completed = store.completed("groel", Source::Ncbi).unwrap();
        assert_eq!(completed.len(), 2);
        assert_eq!(completed[0].source_id.as_deref(), Some("1"));
        assert_eq!(completed[0].fasta, ">1\nAAA");
    }

    #[test]
    fn commit_chunk_replaces_prior_completed_rows() {
        let mut store = FastaStore::open_in_memory().unwrap();
        store
            .commit_chunk("groel", Source::Ncbi, &ids(&["1"]), &ids(&[">1\nold"]))
            .unwrap();
        store
            .commit_chunk("groel", Source::Ncbi, &ids(&["1"]), &ids(&[">1\nnew"]))
            .unwrap();

        let completed = store.completed("groel", Source::Ncbi).unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].fasta, ">1\nnew");
    }

    #[test]
    fn replace_completed_uses_null_source_id() {
        let mut store = FastaStore::open_in_memory().unwrap();
        store
            .replace_completed("groel", Source::Uniprot, &ids(&[">u1\nAAA", ">u2\nCCC"]))
            .unwrap();
        store
            .replace_completed("groel", Source::Uniprot, &ids(&[">u3\nGGG"]))
            .unwrap();

        let completed = store.completed("groel", Source::Uniprot).unwrap();
        assert_eq!(completed.len(), 1);
        assert!(completed[0].source_id.is_none());
        assert_eq!(completed[0].fasta, ">u3\nGGG");
    }
}
