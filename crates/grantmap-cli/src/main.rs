use anyhow::{Context, Result};
use clap::Parser;
use grantmap_core::{GraphData, LayoutStrategy, NodeId, RankDirection};
use grantmap_graph::{DiagramController, LayoutOptions};
use std::path::PathBuf;
use std::str::FromStr;

mod svg;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render a permission-model access graph", long_about = None)]
struct Args {
    /// Path to the graph JSON file (nodes + edges)
    input: PathBuf,

    /// Rank direction for the hierarchical layout
    #[arg(long, default_value = "TB")]
    direction: RankDirection,

    /// Layout strategy
    #[arg(long, default_value = "hierarchical")]
    strategy: LayoutStrategy,

    /// Viewport width in pixels (falls back to 800)
    #[arg(long)]
    width: Option<f32>,

    /// Viewport height in pixels (falls back to 600)
    #[arg(long)]
    height: Option<f32>,

    /// Select a node id to highlight its neighborhood
    #[arg(long)]
    select: Option<String>,

    /// Output format
    #[arg(long, default_value = "json")]
    format: OutputFormat,

    /// Output file; stdout if omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Svg,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "svg" => Ok(OutputFormat::Svg),
            _ => anyhow::bail!("invalid format: {s} (expected json or svg)"),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let data: GraphData = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    if data.is_empty() {
        println!("No graph content to render.");
        return Ok(());
    }

    let options = LayoutOptions {
        direction: args.direction,
        strategy: args.strategy,
        ..LayoutOptions::default()
    };
    let mut controller = DiagramController::new(&data, args.width, args.height, options);

    if let Some(select) = &args.select {
        controller.toggle_select(&NodeId::from(select.as_str()));
    }

    let scene = controller.scene();
    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&scene)?,
        OutputFormat::Svg => svg::render(&scene, controller.viewport()),
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("writing {}", path.display()))?;
            println!(
                "Rendered {} nodes and {} edges to {}",
                scene.nodes.len(),
                scene.edges.len(),
                path.display()
            );
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
