use anyhow::{bail, Context, Result};
use clap::Parser;
use nerpass::{
    run_passes_conf, DictionaryTagger, HarnessConfig, JsonLinesRepository, TokenizerKind,
};
use std::path::PathBuf;

/// Runs the evaluation passes over a JSON-lines file of profiles and prints the report.
#[derive(Debug, Parser)]
struct Args {
    /// Profiles, one JSON object per line with `id`, `raw_text`, `manual_annotation` and `step`
    #[arg(short, long)]
    profiles: PathBuf,
    /// Corpus in the `<START:LABEL> ... <END>` format put in front of every training corpus
    #[arg(short, long)]
    base_corpus: Option<PathBuf>,
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of passes, overriding the configuration
    #[arg(long)]
    passes: Option<u32>,
    #[arg(short, long, default_value_t = TokenizerKind::Simple)]
    tokenizer: TokenizerKind,
    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nerpass=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => HarnessConfig::from_path(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(passes) = args.passes {
        config = config.with_passes(passes)?;
    }
    let base_corpus = match &args.base_corpus {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Could not read the base corpus {}", path.display()))?,
        None => String::new(),
    };
    tracing::info!(
        profiles = %args.profiles.display(),
        tokenizer = %args.tokenizer,
        "starting run"
    );

    let reporter = run_passes_conf(
        JsonLinesRepository::new(&args.profiles),
        DictionaryTagger::new(args.tokenizer),
        args.tokenizer,
        &base_corpus,
        config,
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(&reporter)?);
    } else {
        print!("{}", reporter);
    }
    if let Some(failure) = reporter.failure() {
        bail!("{}", failure);
    }
    Ok(())
}
