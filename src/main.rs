use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use vendorid::{
    corpus, normalize_transaction_name, ModelCache, RecordOutcome, Resolver, StoreConfig,
    VendorIdConfig, VendorService,
};

#[derive(Parser)]
#[command(
    name = "vendorid",
    about = "Identify the vendor behind free-text transaction descriptions",
    version
)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the model artifact; overrides the configured store
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Log filter directive, e.g. `info` or `vendorid=debug,index=info`
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a model from a CSV corpus and upload it to the store
    Build {
        /// CSV with `id,normalized_name,vendor_id` columns
        #[arg(long)]
        corpus: PathBuf,

        /// Treat the name column as raw descriptions and normalize it
        #[arg(long)]
        raw_names: bool,

        /// Skip transfers, payroll and similar rows that name no vendor
        #[arg(long)]
        eligible_only: bool,
    },

    /// Extract the vendor of each description
    Extract {
        /// CSV corpus used to resolve index hits to names and vendors
        #[arg(long)]
        corpus: PathBuf,

        /// Treat the corpus name column as raw descriptions
        #[arg(long)]
        raw_names: bool,

        /// Skip corpus rows that name no vendor
        #[arg(long)]
        eligible_only: bool,

        /// Print candidates and scores for each description
        #[arg(long)]
        explain: bool,

        /// Raw transaction descriptions
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Print the normalized form of each description
    Normalize {
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    let mut cfg = match &cli.config {
        Some(path) => VendorIdConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => VendorIdConfig::default(),
    };
    if let Some(dir) = &cli.store_dir {
        cfg.store.backend = StoreConfig::local(dir);
    }

    match cli.command {
        Commands::Build {
            corpus,
            raw_names,
            eligible_only,
        } => {
            apply_corpus_flags(&mut cfg, raw_names, eligible_only);
            run_build(&cfg, &corpus)
        }
        Commands::Extract {
            corpus,
            raw_names,
            eligible_only,
            explain,
            text,
        } => {
            apply_corpus_flags(&mut cfg, raw_names, eligible_only);
            run_extract(&cfg, &corpus, explain, &text)
        }
        Commands::Normalize { text } => {
            for line in &text {
                println!("{}", normalize_transaction_name(line));
            }
            Ok(())
        }
    }
}

fn init_tracing(filter: &str, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Flags only ever switch a corpus setting on; the config file may already have.
fn apply_corpus_flags(cfg: &mut VendorIdConfig, raw_names: bool, eligible_only: bool) {
    cfg.corpus.raw_names |= raw_names;
    cfg.corpus.eligible_only |= eligible_only;
}

fn run_build(cfg: &VendorIdConfig, path: &Path) -> Result<()> {
    if cfg.store.backend == StoreConfig::InMemory {
        warn!("store backend is in_memory; the artifact will not outlive this process");
    }
    let service = VendorService::from_config(
        cfg,
        Arc::new(vendorid::InMemoryResolver::new()),
        Arc::new(ModelCache::new()),
    )?;
    let reader = cfg.corpus.open(path)
        .with_context(|| format!("opening corpus {}", path.display()))?;
    let model = service.rebuild(reader.training_records())?;
    info!(
        artifact = %service.artifact(),
        entries = model.len(),
        "model ready"
    );
    Ok(())
}

fn run_extract(
    cfg: &VendorIdConfig,
    path: &Path,
    explain: bool,
    text: &[String],
) -> Result<()> {
    if cfg.store.backend == StoreConfig::InMemory {
        bail!("extract needs a persistent store; pass --store-dir or configure store.backend");
    }
    let reader = cfg.corpus.open(path)
        .with_context(|| format!("opening corpus {}", path.display()))?;
    let resolver: Arc<dyn Resolver> = Arc::new(corpus::load_resolver(reader)?);
    let service = VendorService::from_config(cfg, resolver, Arc::new(ModelCache::new()))?;

    if explain {
        for line in text {
            let extraction = service.explain(Some(line))?;
            println!(
                "{line}\tnormalized={}\tfingerprint={}\tnear_duplicates={}",
                extraction.normalized,
                extraction.fingerprint,
                extraction.near_duplicates.len()
            );
            for candidate in &extraction.candidates {
                println!(
                    "  id={}\tvendor={}\tscore={}\texact={}\t{}",
                    candidate.id, candidate.vendor_id, candidate.score, candidate.exact, candidate.name
                );
            }
            println!("  decision={}", display_vendor(extraction.decision));
        }
        return Ok(());
    }

    let descriptions: Vec<Option<&str>> = text.iter().map(|t| Some(t.as_str())).collect();
    let report = service.extract_batch(&descriptions)?;
    for (line, outcome) in text.iter().zip(&report.outcomes) {
        match outcome {
            RecordOutcome::Failed(err) => println!("{line}\terror: {err}"),
            other => println!("{line}\t{}", display_vendor(other.vendor_id())),
        }
    }
    Ok(())
}

fn display_vendor(vendor: Option<u64>) -> String {
    vendor.map_or_else(|| "-".to_string(), |v| v.to_string())
}
