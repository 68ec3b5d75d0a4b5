use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use unifio::combine::{combine, CombineRequest, Input};
use unifio::config::Config;
use unifio::file::loader::{load_input, load_request, load_template, read_stdin, split_format_prefix};
use unifio::file::saver::{render, save_to_file, OutputFormat};

/// Unifio - merge JSON, XML, YAML and CSV documents into one
#[derive(Parser)]
#[command(name = "unifio")]
#[command(version)]
#[command(about = "Merge structured documents and reshape them with JSONPath templates", long_about = None)]
struct Cli {
    /// Input documents, merged in order. Use FORMAT:PATH to force a format; `-` reads stdin
    #[arg(required_unless_present = "request")]
    inputs: Vec<String>,

    /// JSON or YAML template whose string leaves are JSONPath expressions
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Read a complete request ({"inputs": [...], "output_format": {...}}) from a JSON file
    #[arg(long, conflicts_with_all = ["inputs", "template"])]
    request: Option<PathBuf>,

    /// Config file (default: ~/.config/unifio/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Deepest template level evaluated
    #[arg(long)]
    depth_cap: Option<usize>,

    /// Most values a single template leaf may return
    #[arg(long)]
    array_cap: Option<usize>,

    /// Keep CSV cells that look like spreadsheet formulas unchanged
    #[arg(long)]
    no_sanitize: bool,

    /// Output serialization
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write the result to a file instead of stdout (`.gz` compresses)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print projection metadata as JSON to stderr
    #[arg(long)]
    metadata: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("unifio=warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load(),
    };
    if let Some(depth_cap) = cli.depth_cap {
        config.depth_cap = depth_cap;
    }
    if let Some(array_cap) = cli.array_cap {
        config.array_cap = array_cap;
    }
    if cli.no_sanitize {
        config.sanitize_csv = false;
    }
    Ok(config)
}

fn build_request(cli: &Cli) -> Result<CombineRequest> {
    if let Some(path) = &cli.request {
        return load_request(path);
    }

    let mut inputs = Vec::with_capacity(cli.inputs.len());
    let mut stdin_used = false;
    for arg in &cli.inputs {
        let (format, path) = split_format_prefix(arg);
        if path == "-" {
            let format = format.context("Reading from stdin requires a format, e.g. json:-")?;
            if stdin_used {
                anyhow::bail!("stdin can only be used for one input");
            }
            stdin_used = true;
            inputs.push(Input::new(format, read_stdin()?));
        } else {
            inputs.push(load_input(path, format)?);
        }
    }

    let mut request = CombineRequest::new(inputs);
    if let Some(path) = &cli.template {
        request = request.with_template(load_template(path)?);
    }
    Ok(request)
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let request = build_request(&cli)?;

    let response = combine(&request, &config)?;

    if cli.metadata {
        if let Some(metadata) = &response.metadata {
            let line = serde_json::to_string(metadata).context("Failed to serialize metadata")?;
            eprintln!("{}", line);
        }
    }

    let rendered = render(&response.result, cli.format)?;
    match &cli.output {
        Some(path) => save_to_file(path, &rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("Failed to write to stdout")?;
            stdout.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}
