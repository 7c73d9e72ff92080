//! lineage-diagram CLI
//!
//! Renders a column lineage snapshot (JSON) to an SVG file.

use clap::Parser;
use lineage_diagram::coordinator::DiagramConfig;
use lineage_diagram::snapshot::Snapshot;
use lineage_diagram::viewport::Size;
use lineage_diagram::{render_svg, RenderOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "lineage-diagram")]
#[command(version)]
#[command(about = "Render a column lineage snapshot to SVG", long_about = None)]
struct Cli {
    /// Snapshot JSON file (nodes + edges)
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Highlight the lineage of one column
    #[arg(long, value_name = "NODE.COLUMN")]
    select: Option<String>,

    /// Hide nodes whose id and column names do not contain this term
    #[arg(long)]
    search: Option<String>,

    /// Viewport width in pixels
    #[arg(long, default_value = "1600")]
    width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value = "1000")]
    height: f64,

    /// JSON file overriding diagram metrics and viewport limits
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: Option<&Path>) -> Result<DiagramConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(DiagramConfig::default()),
    }
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    Ok(Snapshot::from_json(&text)?)
}

fn run(cli: Cli) -> Result<()> {
    let snapshot = load_snapshot(&cli.input)?;
    let options = RenderOptions {
        size: Size::new(cli.width, cli.height),
        select: cli.select,
        search: cli.search,
        config: load_config(cli.config.as_deref())?,
    };

    let svg = render_svg(&snapshot, &options)?;
    match cli.output {
        Some(path) => {
            fs::write(&path, &svg)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            tracing::info!(path = %path.display(), "diagram written");
        }
        None => print!("{}", svg),
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "metrics": {{ "layer_gap": 400.0 }}, "viewport": {{ "max_zoom": 2.0 }} }}"#)
            .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.metrics.layer_gap, 400.0);
        assert_eq!(config.metrics.node_width, 240.0);
        assert_eq!(config.viewport.max_zoom, 2.0);
    }

    #[test]
    fn test_load_config_default() {
        assert_eq!(load_config(None).unwrap(), DiagramConfig::default());
    }

    #[test]
    fn test_run_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("snapshot.json");
        let output = dir.path().join("out.svg");
        fs::write(
            &input,
            r#"{"nodes":[{"id":"employees","type":"table","columns":[{"name":"salary"}]}],"edges":[]}"#,
        )
        .unwrap();

        let cli = Cli::parse_from([
            "lineage-diagram",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--select",
            "employees.salary",
        ]);
        run(cli).unwrap();

        let svg = fs::read_to_string(&output).unwrap();
        assert!(svg.contains(r#"data-node-id="employees""#));
        assert!(svg.contains("row current"));
    }

    #[test]
    fn test_run_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from([
            "lineage-diagram",
            dir.path().join("missing.json").to_str().unwrap(),
        ]);
        let err = run(cli).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }
}
