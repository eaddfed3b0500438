use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Chart colours
// ---------------------------------------------------------------------------

/// Colour of single-series charts (line, bar, histogram).
pub const SERIES_COLOR: Color32 = Color32::from_rgb(99, 110, 250);

/// Red → white → blue diverging stops (ColorBrewer RdBu, 11 classes).
const RD_BU: [(u8, u8, u8); 11] = [
    (103, 0, 31),
    (178, 24, 43),
    (214, 96, 77),
    (244, 165, 130),
    (253, 219, 199),
    (247, 247, 247),
    (209, 229, 240),
    (146, 197, 222),
    (67, 147, 195),
    (33, 102, 172),
    (5, 48, 97),
];

fn linear(stop: (u8, u8, u8)) -> LinSrgb {
    Srgb::new(stop.0, stop.1, stop.2)
        .into_format::<f32>()
        .into_linear()
}

/// Sample the RdBu ramp at `t` in `[0, 1]`, blending neighbouring stops in
/// linear RGB.
pub fn rd_bu_at(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0) * (RD_BU.len() - 1) as f32;
    let lower = t.floor() as usize;
    let upper = (lower + 1).min(RD_BU.len() - 1);
    let mixed = linear(RD_BU[lower]).mix(linear(RD_BU[upper]), t - lower as f32);
    let rgb: Srgb<u8> = Srgb::<f32>::from_linear(mixed).into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// `n` colours spread evenly across the RdBu ramp, for pie slices.
pub fn rd_bu_palette(n: usize) -> Vec<Color32> {
    match n {
        0 => Vec::new(),
        1 => vec![rd_bu_at(0.0)],
        _ => (0..n)
            .map(|i| rd_bu_at(i as f32 / (n - 1) as f32))
            .collect(),
    }
}
