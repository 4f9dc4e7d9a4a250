use std::process::ExitCode;

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use fasta_sync::config::SyncConfig;
use fasta_sync::entrez::EntrezHttpClient;
use fasta_sync::error::SyncError;
use fasta_sync::store::FastaStore;
use fasta_sync::sync::Syncer;
use fasta_sync::uniprot::UniprotHttpClient;

#[derive(Parser)]
#[command(name = "fasta-sync")]
#[command(about = "Sync a local store of protein FASTA records with NCBI entrez and UniProt")]
#[command(version, author)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Replace the pending id set for a query from a full entrez search")]
    Update {
        #[arg(required = true)]
        query: Vec<String>,
    },
    #[command(
        name = "upgrade_ncbi",
        about = "Fetch pending entrez records in chunks and upsert them"
    )]
    UpgradeNcbi {
        #[arg(required = true)]
        query: Vec<String>,
    },
    #[command(
        name = "upgrade_uniprot",
        about = "Replace the completed uniprot record set for a query"
    )]
    UpgradeUniprot {
        #[arg(required = true)]
        query: Vec<String>,
    },
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<SyncError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &SyncError) -> u8 {
    match error {
        SyncError::EntrezHttp(_)
        | SyncError::EntrezStatus { .. }
        | SyncError::UniprotHttp(_)
        | SyncError::UniprotStatus { .. }
        | SyncError::SearchParse(_) => 3,
        SyncError::LengthMismatch { .. } | SyncError::Store(_) => 2,
        SyncError::InvalidLimit { .. } => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("subcommand required: update | upgrade_ncbi | upgrade_uniprot");
        return Ok(());
    };

    let config = SyncConfig::from_env();
    let store = FastaStore::open(&config.database_path).into_diagnostic()?;
    let entrez = EntrezHttpClient::new(config.api_key.clone()).into_diagnostic()?;
    let uniprot = UniprotHttpClient::new().into_diagnostic()?;
    let mut syncer = Syncer::new(store, entrez, uniprot).with_chunk_size(config.chunk_size);

    match command {
        Commands::Update { query } => {
            let query = query.join(" ");
            let count = syncer.update(&query).into_diagnostic()?;
            tracing::info!(query, count, "update finished");
        }
        Commands::UpgradeNcbi { query } => {
            let query = query.join(" ");
            let count = syncer.upgrade_ncbi(&query).into_diagnostic()?;
            tracing::info!(query, count, "upgrade_ncbi finished");
        }
        Commands::UpgradeUniprot { query } => {
            let query = query.join(" ");
            let count = syncer.upgrade_uniprot(&query).into_diagnostic()?;
            tracing::info!(query, count, "upgrade_uniprot finished");
        }
    }

    Ok(())
}
