use std::path::PathBuf;

/// Runtime configuration resolved once at startup and passed explicitly to
/// the clients and the store. Nothing below reads the environment on its own.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub database_path: PathBuf,
    pub api_key: Option<String>,
    pub chunk_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("fasta.db"),
            api_key: None,
            chunk_size: 500,
        }
    }
}

impl SyncConfig {
    /// Reads `FASTA_SYNC_DB` and `NCBI_API_KEY`; blank values count as unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("FASTA_SYNC_DB") {
            if !path.trim().is_empty() {
                config.database_path = PathBuf::from(path);
            }
        }
        if let Ok(key) = std::env::var("NCBI_API_KEY") {
            if !key.trim().is_empty() {
                config.api_key = Some(key.trim().to_string());
            }
        }
        config
    }
}
