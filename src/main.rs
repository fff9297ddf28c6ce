#![allow(dead_code)]

use anyhow::{Context, Result};
use clap::Parser;

use streamgraph::config::{self, ConfigBlock};
use streamgraph::connection::PortAddr;
use streamgraph::logging;
use streamgraph::pipeline::Pipeline;
use streamgraph::registry;

/// streamgraph - a typed dataflow pipeline runtime
#[derive(Parser)]
#[command(name = "streamgraph")]
#[command(version = "0.1.0")]
#[command(about = "streamgraph: a typed dataflow pipeline runtime")]
#[command(long_about =
"------------------------------------------------------------
    streamgraph

    Wires typed processes into a validated dataflow graph and
    drives it to completion with a chosen scheduler. Pipelines
    are described with TOML configuration files.
------------------------------------------------------------")]
struct Cli {
    /// Pipeline description file path
    #[arg(short, long, default_value = "./config/pipeline.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Scheduler to drive the pipeline with
    #[arg(short, long, default_value = "synchronous")]
    scheduler: String,

    /// List available process types and exit
    #[arg(short = 'L', long)]
    list_processors: bool,

    /// List available scheduler types and exit
    #[arg(short = 'S', long)]
    list_schedulers: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);
    registry::ensure_default_catalog();

    if cli.list_processors {
        println!("Available process types:");
        for name in registry::list_process_types() {
            println!("  - {name}");
        }
        return Ok(());
    }

    if cli.list_schedulers {
        println!("Available scheduler types:");
        for name in registry::list_scheduler_types() {
            println!("  - {name}");
        }
        return Ok(());
    }

    let config = config::load_config(&cli.config)
        .with_context(|| format!("loading pipeline description '{}'", cli.config))?;

    let pipeline = build_pipeline(&config).context("building pipeline from description")?;

    tracing::info!("pipeline built and validated, starting scheduler '{}'", cli.scheduler);
    let mut scheduler = registry::create_scheduler(&cli.scheduler, pipeline, &config)
        .with_context(|| format!("unknown scheduler type '{}'", cli.scheduler))?;

    scheduler.start().context("starting scheduler")?;
    scheduler.wait().context("waiting for scheduler")?;

    tracing::info!("pipeline finished");
    Ok(())
}

/// Builds and validates a [`Pipeline`] from a flattened configuration:
/// every top-level key not prefixed with `_` names a process whose
/// `<name>:type` selects its registered constructor and whose remaining
/// keys under `<name>:*` are its own configuration; `_connections:<i>:from`
/// / `_connections:<i>:to` name `process.port` endpoints to wire.
fn build_pipeline(config: &ConfigBlock) -> Result<Pipeline> {
    let mut pipeline = Pipeline::new(config.clone());

    for name in process_names(config)? {
        let type_name = config
            .get(&format!("{name}:type"))
            .with_context(|| format!("process '{name}' is missing its 'type' key"))?;
        let sub = config.subblock(&name).unwrap_or_else(|_| ConfigBlock::empty(&name));
        let process = registry::create_process(&type_name, &name, &sub)
            .with_context(|| format!("constructing process '{name}' of type '{type_name}'"))?;
        pipeline.add_process(&name, process)?;
    }

    for (from, to) in connections(config)? {
        pipeline.connect(parse_port_addr(&from)?, parse_port_addr(&to)?)?;
    }

    pipeline.setup_pipeline().context("setup_pipeline")?;
    Ok(pipeline)
}

fn process_names(config: &ConfigBlock) -> Result<Vec<String>> {
    let mut names: Vec<String> = config
        .available_values()
        .context("listing configuration keys")?
        .into_iter()
        .filter_map(|key| key.split(':').next().map(str::to_string))
        .filter(|name| !name.starts_with('_'))
        .collect();
    names.sort();
    names.dedup();
    Ok(names)
}

fn connections(config: &ConfigBlock) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    let mut i = 0;
    loop {
        let from = match config.get(&format!("_connections:{i}:from")) {
            Ok(v) => v,
            Err(_) => break,
        };
        let to = config
            .get(&format!("_connections:{i}:to"))
            .with_context(|| format!("_connections:{i} has 'from' but no 'to'"))?;
        out.push((from, to));
        i += 1;
    }
    Ok(out)
}

fn parse_port_addr(spec: &str) -> Result<PortAddr> {
    let (process, port) = spec
        .split_once('.')
        .with_context(|| format!("'{spec}' is not a 'process.port' address"))?;
    Ok(PortAddr::new(process, port))
}
