use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| hsl_to_color32((i as f32 / n as f32) * 360.0, 0.75, 0.55))
        .collect()
}

// ---------------------------------------------------------------------------
// Continuous scale: number → Color32
// ---------------------------------------------------------------------------

const SCALE_HUE_LOW: f32 = 260.0;
const SCALE_HUE_HIGH: f32 = 50.0;

/// Maps a numeric range onto a purple → yellow hue sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
}

impl ColorScale {
    /// Scale spanning the finite values of `values`. `None` if there are none.
    pub fn spanning(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;
        Some(Self { min, max })
    }

    /// Position of `value` in the scale, clamped to `[0, 1]`. A degenerate
    /// range maps everything to the middle.
    pub fn position(&self, value: f64) -> f32 {
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            return 0.5;
        }
        ((value - self.min) / range).clamp(0.0, 1.0) as f32
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        let t = self.position(value);
        hsl_to_color32(SCALE_HUE_LOW + (SCALE_HUE_HIGH - SCALE_HUE_LOW) * t, 0.8, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let colours = generate_palette(4);
        assert_eq!(colours.len(), 4);
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn scale_clamps_and_handles_flat_ranges() {
        let scale = ColorScale::spanning([2.0, 4.0]).unwrap();
        assert_eq!(scale.position(2.0), 0.0);
        assert_eq!(scale.position(3.0), 0.5);
        assert_eq!(scale.position(10.0), 1.0);
        assert_ne!(scale.color_for(2.0), scale.color_for(4.0));

        let flat = ColorScale::spanning([7.0, 7.0]).unwrap();
        assert_eq!(flat.position(7.0), 0.5);
        assert!(ColorScale::spanning(Vec::<f64>::new()).is_none());
    }
}
