use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sha2::Digest as _;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "strobe", version)]
struct Cli {
    /// Log filter (overridden by RUST_LOG).
    #[arg(long, global = true, default_value = "info")]
    log: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Animate every surface described by the spec files until all workers finish.
    Run(RunArgs),
    /// Parse spec files and print the normalized surfaces as JSON.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Spec files (`.json` or line format).
    #[arg(required = true)]
    specs: Vec<PathBuf>,

    /// Write each retained surface's final frame as a PNG into this directory.
    #[arg(long)]
    ghost_dir: Option<PathBuf>,

    /// Print a SHA-256 digest of every surface's final pixels.
    #[arg(long, default_value_t = false)]
    digest: bool,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Spec files (`.json` or line format).
    #[arg(required = true)]
    specs: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log)?;
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn init_logging(default: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .with_context(|| format!("invalid log filter '{default}'"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Load every spec file, skipping (and reporting) files that fail to load.
fn load_all(paths: &[PathBuf]) -> anyhow::Result<Vec<strobe::SurfaceSpec>> {
    let mut specs = Vec::new();
    for path in paths {
        match strobe::load_specs(path) {
            Ok(mut s) => {
                tracing::info!(file = %path.display(), surfaces = s.len(), "loaded spec file");
                specs.append(&mut s);
            }
            Err(e) => tracing::error!(file = %path.display(), error = %e, "skipping spec file"),
        }
    }
    if specs.is_empty() {
        anyhow::bail!("no surfaces to run");
    }
    Ok(specs)
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let specs = load_all(&args.specs)?;
    let doc = strobe::spec::model::SpecDocument { surfaces: specs };
    let json = serde_json::to_string_pretty(&doc).with_context(|| "serialize specs")?;
    println!("{json}");
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let specs = load_all(&args.specs)?;

    let compositor = strobe::HeadlessCompositor::new();
    let mut manager = strobe::WorkerManager::new(
        Arc::new(compositor.clone()),
        Arc::new(strobe::PluginRegistry::with_builtins()),
    );
    let report = manager.run(specs);

    for w in &report.workers {
        eprintln!(
            "{:<24} {:<40} iterations={} paints={} transactions={}{}",
            w.name,
            format!("{:?}", w.outcome),
            w.iterations,
            w.paints,
            w.transactions,
            if w.retained { " (ghost)" } else { "" }
        );
    }

    if let Some(dir) = args.ghost_dir.as_deref() {
        write_ghosts(&manager, &compositor, dir)?;
    }

    if args.digest {
        for snap in compositor.snapshots() {
            println!("{}  {}", sha256_hex(&snap.pixels), snap.name);
        }
    }

    Ok(())
}

fn write_ghosts(
    manager: &strobe::WorkerManager,
    compositor: &strobe::HeadlessCompositor,
    dir: &Path,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create ghost dir '{}'", dir.display()))?;

    let snapshots = compositor.snapshots();
    for ghost in manager.retained() {
        let Some(id) = ghost.surface_id() else {
            continue;
        };
        let Some(snap) = snapshots.iter().find(|s| s.id == id) else {
            continue;
        };
        let Some(img) = snap.to_rgba8() else {
            tracing::warn!(surface = %snap.name, format = snap.format.name(), "cannot export pixels");
            continue;
        };

        let out = dir.join(format!("{}-{}.png", sanitize(&snap.name), id.0));
        img.save_with_format(&out, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn sanitize(name: &str) -> String {
    let s: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if s.is_empty() { "surface".to_string() } else { s }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
