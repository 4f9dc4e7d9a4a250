pub mod config;
pub mod entrez;
pub mod error;
pub mod fasta;
pub mod retry;
pub mod store;
pub mod sync;
pub mod uniprot;
