//! Source-over blending for straight-alpha RGBA8 pixels.

pub type Rgba8 = [u8; 4];

/// Composite `src` over `dst` with an extra global alpha, canvas style.
///
/// Both pixels carry straight alpha. The effective source alpha is
/// `src.a * opacity`; a fully transparent source leaves `dst` untouched.
pub fn over(dst: Rgba8, src: Rgba8, opacity: f64) -> Rgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    let sa = f64::from(src[3]) / 255.0 * opacity;
    if sa <= 0.0 {
        return dst;
    }

    let da = f64::from(dst[3]) / 255.0;
    let dst_weight = da * (1.0 - sa);
    let out_a = sa + dst_weight;
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (f64::from(src[i]) * sa + f64::from(dst[i]) * dst_weight) / out_a;
        out[i] = to_u8(c);
    }
    out[3] = to_u8(out_a * 255.0);
    out
}

/// Blend `src` over the pixel at byte offset `idx` of an RGBA buffer.
#[inline]
pub fn over_at(buffer: &mut [u8], idx: usize, src: Rgba8, opacity: f64) {
    let dst = [buffer[idx], buffer[idx + 1], buffer[idx + 2], buffer[idx + 3]];
    buffer[idx..idx + 4].copy_from_slice(&over(dst, src, opacity));
}

#[inline]
fn to_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
