use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: journal name → Color32
// ---------------------------------------------------------------------------

/// Maps journal names to distinct colours so the ranking charts stay
/// consistent across filter changes.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map from the dataset's sorted journal list.
    pub fn new(journals: &[String]) -> Self {
        let palette = generate_palette(journals.len());
        ColorMap {
            mapping: journals.iter().cloned().zip(palette).collect(),
        }
    }

    /// Look up the colour for a journal; unknown names fall back to gray.
    pub fn color_for(&self, journal: &str) -> Color32 {
        self.mapping.get(journal).copied().unwrap_or(Color32::GRAY)
    }
}
