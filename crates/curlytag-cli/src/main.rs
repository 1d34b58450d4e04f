//! `curlytag` - render curly-brace tag templates from the command line.
//!
//! ```text
//! $ curlytag 'Hi, {upper:{args}}!' -a ada -a lovelace
//! Hi, ADA LOVELACE!
//! ```

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use curlytag::random::{RandomSource, SeededRandom, ThreadRandom};
use curlytag::{lex, Context, Engine, EngineConfig};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "curlytag")]
#[command(version, about = "Render curly-brace tag templates", long_about = None)]
struct Cli {
    /// Template text. Read from --file or stdin when omitted
    template: Option<String>,

    /// Read the template from a file
    #[arg(short, long, conflicts_with = "template")]
    file: Option<PathBuf>,

    /// Value for the `args` list (repeatable)
    #[arg(short = 'a', long = "arg", value_name = "ARG")]
    args: Vec<String>,

    /// Separator used by `{args}`
    #[arg(short, long)]
    joiner: Option<String>,

    /// Extra context entry (repeatable)
    #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    set: Vec<(String, String)>,

    /// Engine config file (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for `choose` and `range`
    #[arg(long)]
    seed: Option<u64>,

    /// Print the token tree instead of rendering
    #[arg(long)]
    lex: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    // A subscriber may already be installed when embedded in tests.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn read_template(cli: &Cli, stdin: &mut dyn Read) -> Result<String> {
    if let Some(template) = &cli.template {
        return Ok(template.clone());
    }
    if let Some(path) = &cli.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read template {}", path.display()));
    }
    let mut template = String::new();
    stdin
        .read_to_string(&mut template)
        .context("failed to read template from stdin")?;
    Ok(template)
}

fn build_context(cli: &Cli) -> Context {
    let mut context = Context::new();
    for (key, value) in &cli.set {
        context.insert(key.as_str(), value.as_str());
    }
    if !cli.args.is_empty() {
        context.insert("args", cli.args.clone());
    }
    if let Some(joiner) = &cli.joiner {
        context.insert("joiner", joiner.as_str());
    }
    context
}

fn build_engine(cli: &Cli) -> Result<Engine> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let source: Arc<dyn RandomSource> = match cli.seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(ThreadRandom),
    };
    Ok(Engine::with_random(config, source))
}

fn run(cli: &Cli, stdin: &mut dyn Read) -> Result<String> {
    let template = read_template(cli, stdin)?;

    if cli.lex {
        return Ok(format!("{:#?}", lex(&template)));
    }

    let engine = build_engine(cli)?;
    let context = build_context(cli);
    engine
        .render(&template, &context)
        .context("failed to render template")
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli, &mut io::stdin().lock()) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
