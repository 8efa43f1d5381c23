//! Per-run cluster color assignment.
//!
//! Files living under an installed-packages directory share one randomly-hued
//! color per package; local files keep a fixed default so the user's own code
//! stands out from library code.

use crate::ports::ColorSource;
use std::collections::HashMap;

/// An RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` notation as understood by the layout engine.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Convert from HLS space, all inputs in `0.0..=1.0`.
    pub fn from_hls(hue: f64, lightness: f64, saturation: f64) -> Self {
        if saturation == 0.0 {
            let v = (lightness * 255.0) as u8;
            return Rgb::new(v, v, v);
        }
        let m2 = if lightness <= 0.5 {
            lightness * (1.0 + saturation)
        } else {
            lightness + saturation - lightness * saturation
        };
        let m1 = 2.0 * lightness - m2;
        let channel = |h: f64| -> u8 {
            let h = h.rem_euclid(1.0);
            let v = if h < 1.0 / 6.0 {
                m1 + (m2 - m1) * h * 6.0
            } else if h < 0.5 {
                m2
            } else if h < 2.0 / 3.0 {
                m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0
            } else {
                m1
            };
            (v * 255.0) as u8
        };
        Rgb::new(
            channel(hue + 1.0 / 3.0),
            channel(hue),
            channel(hue - 1.0 / 3.0),
        )
    }
}

/// Tone constants for one presentation variant.
#[derive(Debug, Clone, Copy)]
pub struct PaletteStyle {
    /// Color given to local (tokenless) clusters, never randomized
    pub default_color: Rgb,
    pub lightness: f64,
    pub saturation: f64,
}

impl PaletteStyle {
    /// Color-coded diagram: black default, mid-range tones.
    pub const DIAGRAM: PaletteStyle = PaletteStyle {
        default_color: Rgb::new(0x00, 0x00, 0x00),
        lightness: 0.5,
        saturation: 0.5,
    };

    /// Interactive document: blue default, softer tones against the dark
    /// background.
    pub const DOCUMENT: PaletteStyle = PaletteStyle {
        default_color: Rgb::new(0x3f, 0x52, 0xbf),
        lightness: 0.6,
        saturation: 0.4,
    };
}

/// Run-wide token -> color mapping. A token resolves to the same color for
/// the whole run; distinct tokens draw independent hues from the source.
pub struct Palette {
    style: PaletteStyle,
    assigned: HashMap<String, Rgb>,
    hues: Box<dyn ColorSource>,
}

impl Palette {
    pub fn new(style: PaletteStyle, hues: Box<dyn ColorSource>) -> Self {
        Self {
            style,
            assigned: HashMap::new(),
            hues,
        }
    }

    pub fn default_color(&self) -> Rgb {
        self.style.default_color
    }

    /// Resolve the color for a cluster token. `None` is the local/default
    /// case and never consumes a hue.
    pub fn color_for(&mut self, token: Option<&str>) -> Rgb {
        let Some(token) = token else {
            return self.style.default_color;
        };
        if let Some(color) = self.assigned.get(token) {
            return *color;
        }
        let color = Rgb::from_hls(
            self.hues.next_hue(),
            self.style.lightness,
            self.style.saturation,
        );
        self.assigned.insert(token.to_string(), color);
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedHues(Vec<f64>, usize);

    impl ColorSource for FixedHues {
        fn next_hue(&mut self) -> f64 {
            let hue = self.0[self.1 % self.0.len()];
            self.1 += 1;
            hue
        }
    }

    #[test]
    fn hls_conversion_matches_known_points() {
        // Pure red, green, blue at full saturation
        assert_eq!(Rgb::from_hls(0.0, 0.5, 1.0), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hls(1.0 / 3.0, 0.5, 1.0), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_hls(2.0 / 3.0, 0.5, 1.0), Rgb::new(0, 0, 255));
        // Zero saturation collapses to gray
        assert_eq!(Rgb::from_hls(0.3, 0.5, 0.0), Rgb::new(127, 127, 127));
    }

    #[test]
    fn same_token_reuses_color() {
        let mut palette = Palette::new(
            PaletteStyle::DIAGRAM,
            Box::new(FixedHues(vec![0.0, 1.0 / 3.0], 0)),
        );
        let first = palette.color_for(Some("requests"));
        let again = palette.color_for(Some("requests"));
        let other = palette.color_for(Some("flask"));

        assert_eq!(first, again);
        assert_ne!(first, other, "distinct tokens should draw distinct hues");
    }

    #[test]
    fn tokenless_clusters_get_fixed_default() {
        let mut palette = Palette::new(PaletteStyle::DIAGRAM, Box::new(FixedHues(vec![0.5], 0)));
        assert_eq!(palette.color_for(None), Rgb::new(0, 0, 0));
        // The default never consumes a hue, so the first token still gets
        // the first hue in the sequence.
        let token_color = palette.color_for(Some("requests"));
        assert_eq!(token_color, Rgb::from_hls(0.5, 0.5, 0.5));
    }

    #[test]
    fn hex_notation() {
        assert_eq!(Rgb::new(0x3f, 0x52, 0xbf).to_hex(), "#3f52bf");
        assert_eq!(Rgb::new(0, 0, 0).to_hex(), "#000000");
    }
}
