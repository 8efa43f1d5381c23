// Infrastructure implementations for stackfigure.

pub mod capture;
pub mod color;
pub mod dot;
pub mod html;
pub mod layout;
pub mod plain;

pub use color::ColorRenderer;
pub use html::HtmlRenderer;
pub use plain::PlainRenderer;

use crate::ports::{ColorSource, PathClassifier};
use rand::Rng;
use std::path::Path;

/// Classifies source paths by an installed-packages marker directory: the
/// token is the path component immediately following the marker. Files that
/// sit directly under the marker, or that never pass through it, are local.
pub struct PackageDirClassifier {
    marker: String,
}

impl PackageDirClassifier {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl Default for PackageDirClassifier {
    fn default() -> Self {
        Self::new("site-packages")
    }
}

impl PathClassifier for PackageDirClassifier {
    fn classify(&self, path: &Path) -> Option<String> {
        let mut parts = path.iter();
        while let Some(part) = parts.next() {
            if part == self.marker.as_str() {
                let token = parts.next()?;
                // The token must be a package directory, not the file itself
                parts.next()?;
                return token.to_str().map(String::from);
            }
        }
        None
    }
}

/// Uniformly random hue sampling; one independent sequence per run.
pub struct RandomHues(rand::rngs::ThreadRng);

impl RandomHues {
    pub fn new() -> Self {
        Self(rand::thread_rng())
    }
}

impl Default for RandomHues {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSource for RandomHues {
    fn next_hue(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}
