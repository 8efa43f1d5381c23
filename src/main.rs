// Command-line entry point for stackfigure.

use anyhow::{bail, Result};
use clap::Parser;
use stackfigure::application::FigureUsecase;
use stackfigure::domain::graph::GraphOptions;
use stackfigure::domain::palette::{Palette, PaletteStyle};
use stackfigure::infrastructure::{
    capture, ColorRenderer, HtmlRenderer, PackageDirClassifier, PlainRenderer, RandomHues,
};
use stackfigure::ports::Renderer;
use std::path::Path;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Captured stack snapshot (JSON array of frame records, innermost first)
    #[arg(short, long)]
    input: String,

    /// Output file path (.png, .svg, .dot, or .html for the interactive format)
    #[arg(short, long)]
    output: String,

    /// Presentation variant (plain, color, html)
    #[arg(short, long, default_value = "plain")]
    format: String,

    /// Directory component marking installed packages in frame paths
    #[arg(long, default_value = "site-packages")]
    package_marker: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let frames = capture::load_snapshot(Path::new(&cli.input))?;

    let (style, embed_sources) = match cli.format.as_str() {
        "plain" | "color" => (PaletteStyle::DIAGRAM, false),
        "html" => (PaletteStyle::DOCUMENT, true),
        other => bail!("Unknown format: {other} (expected plain, color, or html)"),
    };
    let options = GraphOptions {
        classifier: Box::new(PackageDirClassifier::new(cli.package_marker.as_str())),
        palette: Palette::new(style, Box::new(RandomHues::new())),
        embed_sources,
    };
    let mut renderer: Box<dyn Renderer> = match cli.format.as_str() {
        "plain" => Box::new(PlainRenderer::new()),
        "color" => Box::new(ColorRenderer::new()),
        _ => Box::new(HtmlRenderer::new()),
    };

    let mut usecase = FigureUsecase {
        renderer: renderer.as_mut(),
    };
    usecase.run(&frames, options, Path::new(&cli.output))?;

    println!(
        "Figure written to {} (format: {})",
        cli.output, cli.format
    );
    Ok(())
}
