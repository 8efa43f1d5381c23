//! External layout-engine boundary.
//!
//! The graph itself is laid out by the Graphviz `dot` binary; this module
//! probes for it, pipes DOT text through it, and surfaces engine failures
//! as-is. There is no degraded rendering path.

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Output container produced by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutFormat {
    Png,
    Svg,
}

impl LayoutFormat {
    fn flag(self) -> &'static str {
        match self {
            LayoutFormat::Png => "-Tpng",
            LayoutFormat::Svg => "-Tsvg",
        }
    }
}

/// Check that the `dot` binary is reachable before piping work into it.
pub fn check_engine_available() -> Result<()> {
    let check = Command::new("dot").arg("-V").output();
    match check {
        Ok(output) if output.status.success() => {
            // dot prints its version banner to stderr
            let version = String::from_utf8_lossy(&output.stderr);
            debug!(version = %version.trim(), "layout engine available");
            Ok(())
        }
        Ok(output) => {
            bail!("dot found but returned error: {:?}", output.status.code());
        }
        Err(_) => {
            bail!("graphviz `dot` not found in PATH. Install graphviz to render figures.");
        }
    }
}

/// Lay out DOT text and write the artifact to `destination`.
pub fn render_to_file(dot_source: &str, destination: &Path, format: LayoutFormat) -> Result<()> {
    let artifact = run_engine(dot_source, format)?;
    std::fs::write(destination, artifact)
        .with_context(|| format!("Failed to write artifact {}", destination.display()))?;
    info!(path = %destination.display(), "figure written");
    Ok(())
}

/// Lay out DOT text and return the artifact bytes (used to embed SVG into
/// the interactive document).
pub fn render_to_bytes(dot_source: &str, format: LayoutFormat) -> Result<Vec<u8>> {
    run_engine(dot_source, format)
}

/// Write DOT text, or an engine-rendered artifact, according to the
/// destination extension: `.dot` passes the text through untouched, `.svg`
/// and everything else go through the engine.
pub fn write_artifact(dot_source: &str, destination: &Path) -> Result<()> {
    match destination.extension().and_then(|e| e.to_str()) {
        Some("dot") => {
            std::fs::write(destination, dot_source)
                .with_context(|| format!("Failed to write {}", destination.display()))?;
            info!(path = %destination.display(), "DOT text written");
            Ok(())
        }
        Some("svg") => render_to_file(dot_source, destination, LayoutFormat::Svg),
        _ => render_to_file(dot_source, destination, LayoutFormat::Png),
    }
}

fn run_engine(dot_source: &str, format: LayoutFormat) -> Result<Vec<u8>> {
    check_engine_available()?;

    let mut child = Command::new("dot")
        .arg(format.flag())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("Failed to spawn graphviz dot")?;

    // Stream the DOT text, but hold any write error until the child has
    // been reaped: an early return here would leave the process behind,
    // and when the engine died mid-read its exit status is the more useful
    // diagnostic than our broken pipe.
    let write_result = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(dot_source.as_bytes()),
        None => Ok(()),
    };

    let output = child
        .wait_with_output()
        .context("Failed to wait for graphviz dot")?;

    if !output.status.success() {
        bail!(
            "graphviz dot failed with exit code {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    write_result.context("Failed to stream DOT text to graphviz")?;
    Ok(output.stdout)
}

/// Describes the engine invocation for a given format. This is primarily
/// for testing without a graphviz installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

/// Build the invocation description for a given format (testable function).
pub fn build_command_spec(format: LayoutFormat) -> EngineCommandSpec {
    EngineCommandSpec {
        program: "dot".to_string(),
        args: vec![format.flag().to_string()],
    }
}
