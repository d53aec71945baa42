// src/font_config.rs

// Font discovery for plot rendering.
// plotters draws text through ab_glyph, which does not look up OS fonts on its own,
// so a system TTF is located once and registered under the family name used everywhere.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use log::{debug, warn};
use plotters::style::FontStyle;

use crate::constants::POINTS_PER_INCH;

/// Font family name every text element is drawn with
pub const FONT_FAMILY: &str = "sans-serif";

/// Common locations of a sans-serif TTF on Linux, macOS and Windows
const SYSTEM_FONT_CANDIDATES: [&str; 8] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONTS_REGISTERED: OnceLock<bool> = OnceLock::new();

fn find_system_font_bytes() -> Option<&'static [u8]> {
    for p in SYSTEM_FONT_CANDIDATES.iter() {
        if Path::new(p).exists() {
            if let Ok(bytes) = fs::read(p) {
                debug!("using font '{p}'");
                // Leak into static for the ab_glyph lifetime
                let leaked = Box::leak(bytes.into_boxed_slice());
                return Some(&*leaked);
            }
        }
    }
    None
}

/// Registers a system font for plot text, once per process.
///
/// Returns `false` when no usable font exists; callers then render
/// without captions and tick labels instead of failing.
pub fn ensure_fonts_registered() -> bool {
    *FONTS_REGISTERED.get_or_init(|| match find_system_font_bytes() {
        Some(bytes) => match plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes)
        {
            Ok(()) => true,
            Err(_) => {
                warn!("system font could not be parsed, text labels disabled");
                false
            }
        },
        None => {
            warn!("no system TTF font found, text labels disabled");
            false
        }
    })
}

/// Converts a font size in points to pixels at the given DPI.
pub fn points_to_px(points: f64, dpi: u32) -> u32 {
    (points * f64::from(dpi) / POINTS_PER_INCH).round().max(1.0) as u32
}
