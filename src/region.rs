//! Secondary localization passes.
//!
//! When every decode attempt comes back empty these passes look for
//! barcode-shaped structure instead of payloads: a stripe template match
//! for 1-D codes and a contour sweep for both stripe and square shapes.
//! They produce [`RegionHint`]s, never decoded content, so callers can
//! crop or re-shoot the promising area. Hint coordinates refer to the
//! normalized image the attempt loop ran on.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::template_matching::{find_extremes, match_template, MatchTemplateMethod};

use crate::report::{Region, RegionHint, RegionKind};
use crate::transforms::edges::edge_map;
use crate::transforms::geometric;

/// Method name reported when the stripe template pass found the region.
pub const STRIPE_TEMPLATE: &str = "stripe_template";
/// Method name reported when the contour pass found the region.
pub const CONTOUR_REGIONS: &str = "contour_regions";

const STRIPE_BAR_WIDTHS: [u32; 3] = [1, 2, 3];
const STRIPE_SPACINGS: [u32; 4] = [2, 3, 4, 5];
const STRIPE_HEIGHT: u32 = 20;
const STRIPE_MIN_CORRELATION: f32 = 0.5;
const STRIPE_MIN_RANGE: u8 = 64;
// Template matching is quadratic in image size, and thin synthetic bars
// still line up with real bars after a downscale, so the pass runs on a
// bounded copy and maps its regions back.
const STRIPE_MAX_DIM: u32 = 800;

const CONTOUR_MIN_AREA: f64 = 500.0;

/// Match small synthetic stripe patterns against the image.
///
/// Templates are four dark bars on white, one per combination of bar
/// width and spacing. Each template that correlates at 0.5 or better at
/// its best location, on a window that actually alternates dark and
/// bright, contributes one hint. Hints come back sorted by correlation,
/// best first.
pub fn stripe_hints(gray: &GrayImage) -> Vec<RegionHint> {
    let longest = gray.width().max(gray.height());
    if longest > STRIPE_MAX_DIM {
        let factor = STRIPE_MAX_DIM as f32 / longest as f32;
        let reduced = geometric::scale(gray, factor);
        stripe_hints_at_scale(&reduced, 1.0 / factor)
    } else {
        stripe_hints_at_scale(gray, 1.0)
    }
}

fn stripe_hints_at_scale(gray: &GrayImage, back_scale: f32) -> Vec<RegionHint> {
    if intensity_stddev(gray) < 8.0 {
        return Vec::new();
    }
    let mut hints = Vec::new();
    for bar_width in STRIPE_BAR_WIDTHS {
        for spacing in STRIPE_SPACINGS {
            let template = stripe_template(bar_width, spacing);
            if gray.width() < template.width() || gray.height() < template.height() {
                continue;
            }
            let scores = match_template(
                gray,
                &template,
                MatchTemplateMethod::CrossCorrelationNormalized,
            );
            let extremes = find_extremes(&scores);
            if extremes.max_value < STRIPE_MIN_CORRELATION {
                continue;
            }
            let (x, y) = extremes.max_value_location;
            if !looks_striped(gray, x, y, template.width(), template.height()) {
                continue;
            }
            hints.push(RegionHint {
                region: scaled_region(x, y, template.width(), template.height(), back_scale),
                kind: RegionKind::Linear,
                score: extremes.max_value,
                label: format!("stripes_w{}_s{}", bar_width, spacing),
            });
        }
    }
    hints.sort_by(|a, b| b.score.total_cmp(&a.score));
    hints
}

/// Find barcode-shaped outlines via edge contours.
///
/// Outer contours of the dilated Canny map are filtered by area, then
/// classified by the aspect ratio of their bounding box: wide boxes
/// (ratio 2 to 10) read as 1-D stripes, near-square boxes (0.5 to 2) as
/// matrix codes. Anything else is discarded. Hints come back largest
/// first.
pub fn contour_hints(gray: &GrayImage) -> Vec<RegionHint> {
    let edges = edge_map(gray, 50.0, 150.0);
    let contours: Vec<Contour<i32>> = find_contours(&edges);
    let mut scored: Vec<(f64, Region, RegionKind)> = Vec::new();
    for contour in &contours {
        if contour.border_type != BorderType::Outer || contour.parent.is_some() {
            continue;
        }
        let area = contour_area(&contour.points);
        if area <= CONTOUR_MIN_AREA {
            continue;
        }
        let region = match bounding_box(&contour.points) {
            Some(region) => region,
            None => continue,
        };
        let ratio = region.aspect_ratio();
        let kind = if ratio > 2.0 && ratio < 10.0 {
            RegionKind::Linear
        } else if ratio > 0.5 && ratio < 2.0 {
            RegionKind::Square
        } else {
            continue;
        };
        scored.push((area, region, kind));
    }
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .map(|(area, region, kind)| RegionHint::from_region(region, kind, area as f32))
        .collect()
}

fn stripe_template(bar_width: u32, spacing: u32) -> GrayImage {
    let width = 4 * bar_width + 3 * spacing;
    let period = bar_width + spacing;
    GrayImage::from_fn(width, STRIPE_HEIGHT, |x, _| {
        image::Luma([if x % period < bar_width { 0 } else { 255 }])
    })
}

fn scaled_region(x: u32, y: u32, width: u32, height: u32, back_scale: f32) -> Region {
    let up = |v: u32| (v as f32 * back_scale).round() as u32;
    Region::new(up(x), up(y), up(width).max(1), up(height).max(1))
}

fn intensity_stddev(gray: &GrayImage) -> f64 {
    let raw = gray.as_raw();
    let count = raw.len().max(1) as f64;
    let mut sum = 0u64;
    let mut sum_sq = 0u64;
    for &value in raw {
        sum += value as u64;
        sum_sq += value as u64 * value as u64;
    }
    let mean = sum as f64 / count;
    (sum_sq as f64 / count - mean * mean).max(0.0).sqrt()
}

// Normalized cross-correlation also peaks on plain edges and bright
// patches. A genuine stripe window alternates dark and bright several
// times per row, so count threshold crossings before accepting a match.
fn looks_striped(gray: &GrayImage, x: u32, y: u32, width: u32, height: u32) -> bool {
    let x_end = (x + width).min(gray.width());
    let y_end = (y + height).min(gray.height());
    if x_end <= x + 1 || y_end <= y {
        return false;
    }

    let (mut min, mut max) = (u8::MAX, u8::MIN);
    for yy in y..y_end {
        for xx in x..x_end {
            let value = gray.get_pixel(xx, yy)[0];
            min = min.min(value);
            max = max.max(value);
        }
    }
    if max.saturating_sub(min) < STRIPE_MIN_RANGE {
        return false;
    }

    let cut = min as u16 + max.saturating_sub(min) as u16 / 2;
    let mut striped_rows = 0u32;
    for yy in y..y_end {
        let mut transitions = 0u32;
        let mut previous = gray.get_pixel(x, yy)[0] as u16 > cut;
        for xx in (x + 1)..x_end {
            let current = gray.get_pixel(xx, yy)[0] as u16 > cut;
            if current != previous {
                transitions += 1;
            }
            previous = current;
        }
        if transitions >= 5 {
            striped_rows += 1;
        }
    }
    striped_rows * 2 >= y_end - y
}

// Shoelace area over the contour polygon.
fn contour_area(points: &[imageproc::point::Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut doubled = 0i64;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        doubled += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    doubled.abs() as f64 / 2.0
}

fn bounding_box(points: &[imageproc::point::Point<i32>]) -> Option<Region> {
    let first = points.first()?;
    let (mut min_x, mut min_y) = (first.x, first.y);
    let (mut max_x, mut max_y) = (first.x, first.y);
    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }
    Some(Region::new(
        min_x.max(0) as u32,
        min_y.max(0) as u32,
        (max_x - min_x + 1).max(1) as u32,
        (max_y - min_y + 1).max(1) as u32,
    ))
}
