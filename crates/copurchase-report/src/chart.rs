//! Shared plotting helpers: output setup, label measuring and colour scales.

use std::path::Path;

use anyhow::{Context, Result};
use plotters::prelude::*;

pub const FONT: &str = "sans-serif";

/// Creates the parent directory of `path` so the backend can write to it.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    Ok(())
}

/// Widest rendered label in pixels; 0 for an empty list or an unmeasurable font.
pub fn max_label_width<'a, I>(labels: I, size: f64, style: FontStyle) -> u32
where
    I: IntoIterator<Item = &'a String>,
{
    let font = FontDesc::new(FontFamily::SansSerif, size, style);
    labels.into_iter().filter_map(|l| font.box_size(l).ok()).map(|(w, _)| w).max().unwrap_or(0)
}

const YL_GN_BU: [RGBColor; 9] = [
    RGBColor(0xff, 0xff, 0xd9),
    RGBColor(0xed, 0xf8, 0xb1),
    RGBColor(0xc7, 0xe9, 0xb4),
    RGBColor(0x7f, 0xcd, 0xbb),
    RGBColor(0x41, 0xb6, 0xc4),
    RGBColor(0x1d, 0x91, 0xc0),
    RGBColor(0x22, 0x5e, 0xa8),
    RGBColor(0x25, 0x34, 0x94),
    RGBColor(0x08, 0x1d, 0x58),
];

const GREENS: [RGBColor; 9] = [
    RGBColor(0xf7, 0xfc, 0xf5),
    RGBColor(0xe5, 0xf5, 0xe0),
    RGBColor(0xc7, 0xe9, 0xc0),
    RGBColor(0xa1, 0xd9, 0x9b),
    RGBColor(0x74, 0xc4, 0x76),
    RGBColor(0x41, 0xab, 0x5d),
    RGBColor(0x23, 0x8b, 0x45),
    RGBColor(0x00, 0x6d, 0x2c),
    RGBColor(0x00, 0x44, 0x1b),
];

/// Yellow → green → blue sequential scale.
pub fn yl_gn_bu() -> DerivedColorMap<RGBColor> { DerivedColorMap::new(&YL_GN_BU) }

/// Light → dark green sequential scale.
pub fn greens() -> DerivedColorMap<RGBColor> { DerivedColorMap::new(&GREENS) }

/// Colour of `value` on `scale` stretched over `[lo, hi]`. A flat range maps
/// to the light end.
pub fn shade(scale: &DerivedColorMap<RGBColor>, value: f64, lo: f64, hi: f64) -> RGBColor {
    if hi > lo && value.is_finite() {
        scale.get_color_normalized(value, lo, hi)
    } else {
        scale.get_color(0.0_f64)
    }
}
