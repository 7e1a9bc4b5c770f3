use std::{env, fs, path::PathBuf};

use csmp_core::config::Config;
use csmp_core::types::MoleculeCandidate;
use csmp_corpus::table::{ensure_corpus_table, open_db};
use csmp_corpus::writer::seed_candidates;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <molecules.json> [--fresh]", args[0]);
        eprintln!("Example: {} ./dev_data/molecules.json --fresh", args[0]);
        std::process::exit(1);
    }
    let input_path = PathBuf::from(&args[1]);
    let fresh = args.iter().skip(2).any(|a| a == "--fresh");

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;

    println!("csmp-seed\n=========");
    println!("Input: {}", input_path.display());
    println!("Corpus: {} (table: {})", config.corpus.uri, config.corpus.table);

    let raw = fs::read_to_string(&input_path)?;
    let candidates: Vec<MoleculeCandidate> = serde_json::from_str(&raw)?;
    println!("Loaded {} molecules", candidates.len());

    if fresh {
        let path = PathBuf::from(&config.corpus.uri);
        if path.exists() {
            println!("⚠️  Removing existing corpus at {}", path.display());
            fs::remove_dir_all(&path)?;
        }
    }

    let conn = open_db(&config.corpus.uri).await?;
    ensure_corpus_table(&conn, &config.corpus.table).await?;
    let written = seed_candidates(&conn, &config.corpus.table, &candidates).await?;

    println!("\n✅ Seeded {} molecules into '{}'", written, config.corpus.table);
    println!("💡 To annotate spectra, use: cargo run --bin csmp-annotate '<spectra.json>'");
    Ok(())
}
