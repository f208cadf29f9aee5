//! Drawing a garment raster under an affine placement.
//!
//! # Algorithm
//!
//! Drawing uses inverse mapping: for every surface pixel inside the rotated
//! garment's bounding box, the pixel center is mapped back into the
//! garment's local frame and then into source pixel coordinates:
//!
//! ```text
//! lx =  (x - cx) * cos(θ) + (y - cy) * sin(θ)
//! ly = -(x - cx) * sin(θ) + (y - cy) * cos(θ)
//! u  = (lx + w/2) * src_w / w
//! v  = (ly + h/2) * src_h / h
//! ```
//!
//! Pixels whose center falls outside the garment rectangle are left alone.
//! Interpolation happens on premultiplied values so transparent garment
//! borders do not bleed dark fringes into the frame.

use super::blend::{over_at, Rgba8};
use crate::decode::{FilterType, Raster};
use crate::transform::ExportPlacement;

/// Draw `garment` onto `surface` at `placement`, blending source-over with
/// the placement's opacity.
///
/// Returns the number of surface pixels covered by the garment rectangle.
pub fn draw_garment(
    surface: &mut Raster,
    garment: &Raster,
    placement: &ExportPlacement,
    filter: FilterType,
) -> usize {
    if garment.is_empty() || surface.is_empty() {
        return 0;
    }
    if !(placement.width > 0.0 && placement.height > 0.0) {
        return 0;
    }

    let corners = placement.corners();
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (x, y) in corners {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    let x0 = min_x.floor().max(0.0) as u32;
    let y0 = min_y.floor().max(0.0) as u32;
    let x1 = (max_x.ceil().max(0.0) as u32).min(surface.width);
    let y1 = (max_y.ceil().max(0.0) as u32).min(surface.height);

    let half_w = placement.width / 2.0;
    let half_h = placement.height / 2.0;
    let scale_x = garment.width as f64 / placement.width;
    let scale_y = garment.height as f64 / placement.height;

    let mut covered = 0;
    for y in y0..y1 {
        for x in x0..x1 {
            let (lx, ly) = placement.to_local(x as f64 + 0.5, y as f64 + 0.5);
            if lx < -half_w || lx >= half_w || ly < -half_h || ly >= half_h {
                continue;
            }
            covered += 1;

            // Continuous source coordinates, pixel centers at integer + 0.5
            let u = (lx + half_w) * scale_x - 0.5;
            let v = (ly + half_h) * scale_y - 0.5;

            let src = match filter {
                FilterType::Nearest => sample_nearest(garment, u, v),
                FilterType::Bilinear => sample_bilinear(garment, u, v),
                FilterType::Lanczos3 => sample_lanczos3(garment, u, v),
            };

            let idx = ((y as usize) * (surface.width as usize) + x as usize) * 4;
            over_at(&mut surface.pixels, idx, src, placement.opacity);
        }
    }

    covered
}

/// Premultiplied pixel as [r*a, g*a, b*a, a] with a in 0..=1.
#[inline]
fn get_premul(image: &Raster, px: i64, py: i64) -> [f64; 4] {
    let px = px.clamp(0, image.width as i64 - 1) as u32;
    let py = py.clamp(0, image.height as i64 - 1) as u32;
    let [r, g, b, a] = image.pixel(px, py);
    let a = f64::from(a) / 255.0;
    [f64::from(r) * a, f64::from(g) * a, f64::from(b) * a, a]
}

/// Convert an accumulated premultiplied value back to straight RGBA8.
fn unpremultiply(p: [f64; 4]) -> Rgba8 {
    let a = p[3].clamp(0.0, 1.0);
    if a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let channel = |c: f64| (c / a).clamp(0.0, 255.0).round() as u8;
    [
        channel(p[0]),
        channel(p[1]),
        channel(p[2]),
        (a * 255.0).round() as u8,
    ]
}

fn sample_nearest(image: &Raster, x: f64, y: f64) -> Rgba8 {
    let px = (x + 0.5).floor().clamp(0.0, (image.width - 1) as f64) as u32;
    let py = (y + 0.5).floor().clamp(0.0, (image.height - 1) as f64) as u32;
    image.pixel(px, py)
}

/// Sample a pixel using bilinear interpolation.
///
/// Bilinear interpolation considers the 4 nearest pixels and weights
/// their contribution based on distance. Edges are clamped.
fn sample_bilinear(image: &Raster, x: f64, y: f64) -> Rgba8 {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_premul(image, x0, y0);
    let p10 = get_premul(image, x0 + 1, y0);
    let p01 = get_premul(image, x0, y0 + 1);
    let p11 = get_premul(image, x0 + 1, y0 + 1);

    let mut result = [0.0f64; 4];
    for i in 0..4 {
        result[i] = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
    }

    unpremultiply(result)
}

/// Sample a pixel using Lanczos3 interpolation.
///
/// Lanczos3 considers a 6x6 neighborhood of pixels, providing
/// higher quality results especially for sharp edges.
fn sample_lanczos3(image: &Raster, x: f64, y: f64) -> Rgba8 {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 4];
    let mut weight_sum = 0.0;

    // Sample 6x6 neighborhood
    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;

            let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);
            let pixel = get_premul(image, px, py);
            for i in 0..4 {
                sum[i] += pixel[i] * weight;
            }
            weight_sum += weight;
        }
    }

    if weight_sum.abs() < f64::EPSILON {
        return sample_bilinear(image, x, y);
    }

    // Clamp premultiplied color to alpha so overshoot cannot exceed 255
    let a = (sum[3] / weight_sum).clamp(0.0, 1.0);
    let mut result = [0.0f64; 4];
    for i in 0..3 {
        result[i] = (sum[i] / weight_sum).clamp(0.0, 255.0 * a);
    }
    result[3] = a;

    unpremultiply(result)
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;

    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba8 = [255, 0, 0, 255];
    const BLACK: Rgba8 = [0, 0, 0, 255];

    fn placement(cx: f64, cy: f64, w: f64, h: f64, rotation_deg: f64, opacity: f64) -> ExportPlacement {
        ExportPlacement {
            center_x: cx,
            center_y: cy,
            width: w,
            height: h,
            rotation_rad: rotation_deg.to_radians(),
            opacity,
        }
    }

    /// Bounding box of pixels that differ from black.
    fn painted_bounds(surface: &Raster) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for y in 0..surface.height {
            for x in 0..surface.width {
                if surface.pixel(x, y) != BLACK {
                    bounds = Some(match bounds {
                        None => (x, y, x, y),
                        Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                    });
                }
            }
        }
        bounds
    }

    #[test]
    fn test_axis_aligned_draw_covers_exact_rect() {
        let mut surface = Raster::filled(40, 30, BLACK);
        let garment = Raster::filled(5, 5, RED);

        let covered = draw_garment(&mut surface, &garment, &placement(20.0, 15.0, 10.0, 6.0, 0.0, 1.0), FilterType::Bilinear);

        assert_eq!(covered, 60);
        assert_eq!(painted_bounds(&surface), Some((15, 12, 24, 17)));
        assert_eq!(surface.pixel(20, 15), RED);
        assert_eq!(surface.pixel(14, 15), BLACK);
    }

    #[test]
    fn test_opacity_applies() {
        let mut surface = Raster::filled(20, 20, BLACK);
        let garment = Raster::filled(4, 4, [255, 255, 255, 255]);

        draw_garment(&mut surface, &garment, &placement(10.0, 10.0, 8.0, 8.0, 0.0, 0.5), FilterType::Nearest);

        assert_eq!(surface.pixel(10, 10), [128, 128, 128, 255]);
    }

    #[test]
    fn test_transparent_garment_pixels_keep_frame() {
        let mut surface = Raster::filled(20, 20, BLACK);
        let garment = Raster::filled(4, 4, [255, 255, 255, 0]);

        let covered = draw_garment(&mut surface, &garment, &placement(10.0, 10.0, 8.0, 8.0, 0.0, 1.0), FilterType::Bilinear);

        assert_eq!(covered, 64);
        assert_eq!(painted_bounds(&surface), None);
    }

    #[test]
    fn test_rotation_90_swaps_extent() {
        let mut surface = Raster::filled(60, 60, BLACK);
        let garment = Raster::filled(4, 2, RED);

        draw_garment(&mut surface, &garment, &placement(30.0, 30.0, 20.0, 10.0, 90.0, 1.0), FilterType::Bilinear);

        let (x0, y0, x1, y1) = painted_bounds(&surface).unwrap();
        let (w, h) = (x1 - x0 + 1, y1 - y0 + 1);
        assert!((w as i32 - 10).abs() <= 1, "width {}", w);
        assert!((h as i32 - 20).abs() <= 1, "height {}", h);
    }

    #[test]
    fn test_rotation_keeps_center() {
        let mut surface = Raster::filled(80, 80, BLACK);
        let garment = Raster::filled(8, 8, RED);

        draw_garment(&mut surface, &garment, &placement(30.0, 50.0, 16.0, 16.0, 20.0, 1.0), FilterType::Lanczos3);

        assert_eq!(surface.pixel(30, 50), RED);
        let (x0, y0, x1, y1) = painted_bounds(&surface).unwrap();
        let cx = (x0 + x1 + 1) as f64 / 2.0;
        let cy = (y0 + y1 + 1) as f64 / 2.0;
        assert!((cx - 30.0).abs() <= 1.0 && (cy - 50.0).abs() <= 1.0);
    }

    #[test]
    fn test_draw_clipped_at_surface_edges() {
        let mut surface = Raster::filled(10, 10, BLACK);
        let garment = Raster::filled(4, 4, RED);

        let covered = draw_garment(&mut surface, &garment, &placement(0.0, 0.0, 8.0, 8.0, 0.0, 1.0), FilterType::Bilinear);

        assert_eq!(covered, 16);
        assert_eq!(painted_bounds(&surface), Some((0, 0, 3, 3)));
    }

    #[test]
    fn test_fully_offscreen_draws_nothing() {
        let mut surface = Raster::filled(10, 10, BLACK);
        let garment = Raster::filled(4, 4, RED);

        let covered = draw_garment(&mut surface, &garment, &placement(-50.0, 200.0, 8.0, 8.0, 15.0, 1.0), FilterType::Bilinear);

        assert_eq!(covered, 0);
    }

    #[test]
    fn test_zero_sized_placement_draws_nothing() {
        let mut surface = Raster::filled(10, 10, BLACK);
        let garment = Raster::filled(4, 4, RED);

        assert_eq!(draw_garment(&mut surface, &garment, &placement(5.0, 5.0, 0.0, 8.0, 0.0, 1.0), FilterType::Bilinear), 0);
        assert_eq!(draw_garment(&mut surface, &garment, &placement(5.0, 5.0, f64::NAN, 8.0, 0.0, 1.0), FilterType::Bilinear), 0);
    }

    #[test]
    fn test_upscaled_garment_keeps_left_right_halves() {
        let mut garment = Raster::filled(2, 1, RED);
        garment.pixels[4..8].copy_from_slice(&[0, 0, 255, 255]);
        let mut surface = Raster::filled(40, 20, BLACK);

        draw_garment(&mut surface, &garment, &placement(20.0, 10.0, 20.0, 10.0, 0.0, 1.0), FilterType::Nearest);

        assert_eq!(surface.pixel(12, 10), RED);
        assert_eq!(surface.pixel(27, 10), [0, 0, 255, 255]);
    }

    #[test]
    fn test_interpolation_produces_valid_alpha_on_soft_edges() {
        let mut garment = Raster::filled(6, 6, [255, 255, 255, 0]);
        for y in 2..4 {
            for x in 2..4 {
                let idx = ((y * 6 + x) * 4) as usize;
                garment.pixels[idx..idx + 4].copy_from_slice(&[255, 255, 255, 255]);
            }
        }
        let mut surface = Raster::filled(30, 30, BLACK);

        draw_garment(&mut surface, &garment, &placement(15.0, 15.0, 24.0, 24.0, 37.0, 1.0), FilterType::Lanczos3);

        for px in surface.pixels.chunks_exact(4) {
            assert_eq!(px[3], 255, "frame alpha must stay opaque");
            // Premultiplied sampling: no dark-fringe color shift, grey only
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn test_lanczos_weight_at_zero() {
        let w = lanczos_weight(0.0, 3.0);
        assert!((w - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_at_boundary() {
        let w = lanczos_weight(3.0, 3.0);
        assert!(w.abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_symmetry() {
        let w1 = lanczos_weight(1.5, 3.0);
        let w2 = lanczos_weight(-1.5, 3.0);
        assert!((w1 - w2).abs() < 1e-10);
    }

    #[test]
    fn test_bilinear_on_single_pixel_image() {
        let garment = Raster::filled(1, 1, [10, 20, 30, 255]);
        assert_eq!(sample_bilinear(&garment, 0.7, -0.3), [10, 20, 30, 255]);
        assert_eq!(sample_lanczos3(&garment, 0.2, 0.2), [10, 20, 30, 255]);
    }
}
