use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nefnir::config::{self, Config};
use nefnir::{CasePolicy, Lemmatizer, StreamProcessor, TagMatch};

#[derive(Parser)]
#[command(name = "nefnir", about = "Rule-based lemmatizer for POS-tagged text")]
struct Cli {
    /// Read `form SEP tag` records from this file.
    #[arg(short, long)]
    input_file: PathBuf,

    /// Write `form SEP tag SEP lemma` records to this file.
    #[arg(short, long)]
    output_file: PathBuf,

    /// String separating forms, tags and lemmas; backslash escapes allowed.
    #[arg(short, long, default_value = "\\t")]
    separator: String,

    /// Rule table (defaults to rules.json in the data directory).
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Tag map (defaults to tags.json in the data directory, if present).
    #[arg(long)]
    tags: Option<PathBuf>,

    /// Which rule tag patterns apply to a word's tag.
    #[arg(long, value_enum, default_value_t = TagMatch::Prefix)]
    tag_match: TagMatch,

    /// How lemmas are re-capitalized.
    #[arg(long, value_enum, default_value_t = CasePolicy::Restore)]
    case_policy: CasePolicy,

    /// Threads used per sentence.
    #[arg(short = 'j', long, default_value = "1")]
    threads: NonZeroUsize,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<Config> {
        let defaults = Config::from_data_dir(config::resolve_data_dir());
        Ok(Config {
            rules: self.rules.unwrap_or(defaults.rules),
            tags: self.tags.or(defaults.tags),
            separator: config::unescape_separator(&self.separator)?,
            tag_match: self.tag_match,
            case_policy: self.case_policy,
            workers: self.threads,
        })
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let input_file = cli.input_file.clone();
    let output_file = cli.output_file.clone();
    let config = cli.into_config()?;
    config.validate()?;

    let lemmatizer = Lemmatizer::from_config(&config)
        .with_context(|| format!("failed to load rules from {}", config.rules.display()))?;

    info!("Reading input from {}", input_file.display());
    info!("Separator set to {:?}", config.separator);
    let reader = BufReader::new(
        File::open(&input_file).with_context(|| format!("cannot open {}", input_file.display()))?,
    );
    let writer = BufWriter::new(
        File::create(&output_file)
            .with_context(|| format!("cannot create {}", output_file.display()))?,
    );

    StreamProcessor::new(&lemmatizer, config.separator.as_str())?
        .with_workers(config.workers)
        .process(reader, writer)
        .with_context(|| format!("failed to lemmatize {}", input_file.display()))?;

    info!("Output written to {}", output_file.display());
    Ok(())
}
