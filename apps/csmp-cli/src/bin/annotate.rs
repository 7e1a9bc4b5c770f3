use std::{env, fs, path::PathBuf};

use csmp_annotate::response::response_json;
use csmp_annotate::AnnotationPipeline;
use csmp_core::adduct::AdductTable;
use csmp_core::config::Config;
use csmp_core::types::SpectrumRecord;
use csmp_corpus::LanceCorpus;
use csmp_encode::default_encoder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <spectra.json> [--top-k N] [--output FILE]", args[0]);
        eprintln!("Example: {} ./dev_data/spectra.json --top-k 5", args[0]);
        std::process::exit(1);
    }
    let input_path = PathBuf::from(&args[1]);
    let mut top_k_override = None;
    let mut output_path: Option<PathBuf> = None;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--top-k" => {
                if i + 1 < args.len() {
                    if let Ok(k) = args[i + 1].parse::<usize>() {
                        top_k_override = Some(k);
                        i += 1;
                    } else {
                        eprintln!("Error: --top-k requires a number");
                        std::process::exit(1);
                    }
                } else {
                    eprintln!("Error: --top-k requires a number");
                    std::process::exit(1);
                }
            }
            "--output" => {
                if i + 1 < args.len() {
                    output_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --output requires a path");
                    std::process::exit(1);
                }
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    if let Some(k) = top_k_override {
        config.annotate.top_k = k;
    }

    println!("csmp-annotate\n=============");
    println!("Input: {}", input_path.display());
    println!("Corpus: {} (table: {})", config.corpus.uri, config.corpus.table);

    let raw = fs::read_to_string(&input_path)?;
    let records: Vec<SpectrumRecord> = serde_json::from_str(&raw)?;
    println!("Loaded {} spectra", records.len());

    let encoder = default_encoder(&config.encoder, &config.annotate)?;
    let store = std::sync::Arc::new(
        LanceCorpus::new(&config.corpus.uri, &config.corpus.table).await?,
    );
    let pipeline =
        AnnotationPipeline::new(encoder, store, AdductTable::default(), config.annotate)?;

    let results = pipeline.annotate(records).await?;
    let succeeded = results
        .iter()
        .filter(|r| r.status != csmp_core::types::AnnotationStatus::Failed)
        .count();
    println!("Annotated {}/{} spectra", succeeded, results.len());

    let body = serde_json::to_string_pretty(&response_json(&results))?;
    match output_path {
        Some(path) => {
            fs::write(&path, body)?;
            println!("✅ Wrote results to {}", path.display());
        }
        None => println!("{}", body),
    }
    Ok(())
}
