// src/colormaps.rs

use colorous::Gradient;
use plotters::style::RGBColor;

use crate::error::{RenderError, Result};

/// A named continuous colormap with an optional reversal (`_r` suffix).
#[derive(Clone, Copy)]
pub struct Colormap {
    gradient: Gradient,
    reversed: bool,
}

impl std::fmt::Debug for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Colormap")
            .field("reversed", &self.reversed)
            .finish_non_exhaustive()
    }
}

fn gradient_by_name(name: &str) -> Option<Gradient> {
    let gradient = match name {
        "Spectral" => colorous::SPECTRAL,
        "RdBu" => colorous::RED_BLUE,
        "RdYlBu" => colorous::RED_YELLOW_BLUE,
        "RdYlGn" => colorous::RED_YELLOW_GREEN,
        "PuOr" => colorous::PURPLE_ORANGE,
        "BrBG" => colorous::BROWN_GREEN,
        "PiYG" => colorous::PINK_GREEN,
        "viridis" => colorous::VIRIDIS,
        "plasma" => colorous::PLASMA,
        "inferno" => colorous::INFERNO,
        "magma" => colorous::MAGMA,
        "cividis" => colorous::CIVIDIS,
        "turbo" => colorous::TURBO,
        "rainbow" => colorous::RAINBOW,
        // Cyclic maps, used for directions
        "hsv" | "twilight" => colorous::SINEBOW,
        "Blues" => colorous::BLUES,
        "Greens" => colorous::GREENS,
        "Greys" => colorous::GREYS,
        "Oranges" => colorous::ORANGES,
        "Purples" => colorous::PURPLES,
        "Reds" => colorous::REDS,
        "cool" => colorous::COOL,
        "warm" => colorous::WARM,
        "cubehelix" => colorous::CUBEHELIX,
        _ => return None,
    };
    Some(gradient)
}

impl Colormap {
    /// Looks a colormap up by its matplotlib-style name.
    pub fn from_name(name: &str) -> Result<Self> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (name, false),
        };
        gradient_by_name(base)
            .map(|gradient| Self { gradient, reversed })
            .ok_or_else(|| RenderError::UnknownColormap(name.to_string()))
    }

    /// Color at normalized position `t` in [0, 1].
    pub fn eval(&self, t: f64) -> RGBColor {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let t = if self.reversed { 1.0 - t } else { t };
        let c = self.gradient.eval_continuous(t);
        RGBColor(c.r, c.g, c.b)
    }

    /// Maps a data value onto the colormap, clamping to [vmin, vmax].
    /// Returns `None` for NaN so the cell stays transparent.
    pub fn map_value(&self, value: f64, vmin: f64, vmax: f64) -> Option<RGBColor> {
        if !value.is_finite() {
            return None;
        }
        // Ensure span is non-zero to avoid division by zero
        let span = (vmax - vmin).abs().max(1e-12);
        let lo = vmin.min(vmax);
        let t = (value.clamp(lo, lo + span) - lo) / span;
        Some(self.eval(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names_resolve() {
        for name in ["Spectral", "RdBu_r", "viridis", "hsv", "Greys_r"] {
            assert!(Colormap::from_name(name).is_ok(), "{name} should resolve");
        }
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        let err = Colormap::from_name("jetstream").unwrap_err();
        assert!(matches!(err, RenderError::UnknownColormap(ref n) if n == "jetstream"));
    }

    #[test]
    fn test_reversed_swaps_endpoints() {
        let fwd = Colormap::from_name("viridis").unwrap();
        let rev = Colormap::from_name("viridis_r").unwrap();
        assert_eq!(fwd.eval(0.0), rev.eval(1.0));
        assert_eq!(fwd.eval(1.0), rev.eval(0.0));
    }

    #[test]
    fn test_map_value_clamps_and_skips_nan() {
        let cmap = Colormap::from_name("viridis").unwrap();
        assert_eq!(cmap.map_value(-50.0, -1.0, 1.0), Some(cmap.eval(0.0)));
        assert_eq!(cmap.map_value(50.0, -1.0, 1.0), Some(cmap.eval(1.0)));
        assert_eq!(cmap.map_value(0.0, -1.0, 1.0), Some(cmap.eval(0.5)));
        assert!(cmap.map_value(f64::NAN, -1.0, 1.0).is_none());
    }
}
