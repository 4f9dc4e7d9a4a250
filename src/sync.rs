use std::time::Instant;

use crate::entrez::EntrezClient;
use crate::error::SyncError;
use crate::fasta::split_records;
use crate::retry::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::store::{FastaStore, Source};
use crate::uniprot::UniprotClient;

pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// The three sync operations over one store and the two remote clients.
///
/// Strictly sequential: the only suspension points are blocking network I/O
/// and the backoff sleep between fetch retries.
pub struct Syncer<E: EntrezClient, U: UniprotClient> {
    store: FastaStore,
    entrez: E,
    uniprot: U,
    retry: RetryPolicy,
    sleeper: Box<dyn Sleeper>,
    chunk_size: usize,
}

impl<E: EntrezClient, U: UniprotClient> Syncer<E, U> {
    pub fn new(store: FastaStore, entrez: E, uniprot: U) -> Self {
        Self {
            store,
            entrez,
            uniprot,
            retry: RetryPolicy::default(),
            sleeper: Box::new(ThreadSleeper),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        self.chunk_size = chunk_size;
        self
    }

    pub fn store(&self) -> &FastaStore {
        &self.store
    }

    /// Replaces the entrez pending id set for `query` with a fresh full
    /// search. Returns the number of pending ids.
    pub fn update(&mut self, query: &str) -> Result<usize, SyncError> {
        let started = Instant::now();
        let ids = self.entrez.search_all(query)?;
        tracing::info!(query, count = ids.len(), elapsed = ?started.elapsed(), "search finished");

        self.store.replace_pending(query, Source::Ncbi, &ids)?;
        tracing::info!(query, count = ids.len(), "pending id set replaced");
        Ok(ids.len())
    }

    /// Turns the pending entrez ids for `query` into completed records, one
    /// fixed-size chunk at a time. Each chunk is fetched with retry/backoff,
    /// checked for count parity against the requested ids, and committed in
    /// its own transaction, so progress survives a later abort. A count
    /// mismatch is fatal for the whole run. Returns the number of records
    /// upserted.
    pub fn upgrade_ncbi(&mut self, query: &str) -> Result<usize, SyncError> {
        let ids = self.store.pending_ids(query, Source::Ncbi)?;
        let total = ids.len();
        let mut done = 0usize;

        for chunk in ids.chunks(self.chunk_size) {
            tracing::info!(
                query,
                chunk = chunk.len(),
                done,
                total,
                percent = done * 100 / total,
                "downloading records from ncbi"
            );
            let started = Instant::now();
            let records = self.fetch_chunk(chunk)?;
            tracing::info!(elapsed = ?started.elapsed(), "download finished");

            if records.len() != chunk.len() {
                return Err(SyncError::LengthMismatch {
                    expected: chunk.len(),
                    actual: records.len(),
                });
            }

            let started = Instant::now();
            self.store.commit_chunk(query, Source::Ncbi, chunk, &records)?;
            tracing::info!(count = records.len(), elapsed = ?started.elapsed(), "chunk committed");
            done += chunk.len();
        }

        Ok(done)
    }

    /// Replaces the completed uniprot record set for `query` from one bulk
    /// fetch. Returns the number of records inserted.
    pub fn upgrade_uniprot(&mut self, query: &str) -> Result<usize, SyncError> {
        tracing::info!(query, "downloading full record set from uniprot");
        let started = Instant::now();
        let raw = self.uniprot.fetch_all(query)?;
        tracing::info!(elapsed = ?started.elapsed(), "download finished");

        let records = split_records(&raw);
        let started = Instant::now();
        self.store
            .replace_completed(query, Source::Uniprot, &records)?;
        tracing::info!(query, count = records.len(), elapsed = ?started.elapsed(), "completed record set replaced");
        Ok(records.len())
    }

    /// Fetch-and-split with retry. Every fetch failure is retried the same
    /// way, sleeping `attempt * backoff_unit` between tries; with the default
    /// policy this never gives up until externally interrupted.
    fn fetch_chunk(&self, ids: &[String]) -> Result<Vec<String>, SyncError> {
        let mut attempt = 0u32;
        loop {
            match self.entrez.fetch_fasta(ids) {
                Ok(raw) => return Ok(split_records(&raw)),
                Err(err) => {
                    attempt += 1;
                    if self.retry.is_exhausted(attempt) {
                        return Err(err);
                    }
                    let delay = self.retry.delay(attempt);
                    tracing::warn!(error = %err, attempt, ?delay, "fetch failed, backing off");
                    self.sleeper.sleep(delay);
                }
            }
        }
    }
}
