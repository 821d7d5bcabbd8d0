//! Color normalization between rasterizer and display pixel packing
//!
//! The rasterizer packs a pixel as the little-endian bytes `[A, R, G, B]`.
//! The display reads `[R, G, B, X]`, which is the same word shifted right
//! by one byte. Both conversion paths below produce identical words.

/// Bytes discarded from the low end of a native pixel
const SHIFT: i32 = 8;

/// Pack channels into a native rasterizer pixel
#[inline]
#[must_use]
pub const fn pack_native(a: u8, r: u8, g: u8, b: u8) -> u32 {
    u32::from_le_bytes([a, r, g, b])
}

/// Convert one native pixel to display packing
#[inline]
#[must_use]
pub const fn normalize(native: u32) -> u32 {
    native >> SHIFT
}

/// Red, green and blue channels of a display pixel
#[inline]
#[must_use]
pub const fn display_rgb(pixel: u32) -> [u8; 3] {
    let [r, g, b, _] = pixel.to_le_bytes();
    [r, g, b]
}

mod simd_shift {
    use wide::u32x4;

    use super::SHIFT;

    #[inline]
    pub fn copy_shifted(dst: &mut [u32], src: &[u32]) {
        let simd_end = src.len() / 4 * 4;
        let (dst_simd, dst_tail) = dst.split_at_mut(simd_end);
        let (src_simd, src_tail) = src.split_at(simd_end);

        for (d, s) in dst_simd.chunks_exact_mut(4).zip(src_simd.chunks_exact(4)) {
            let v = u32x4::new([s[0], s[1], s[2], s[3]]) >> SHIFT;
            d.copy_from_slice(&v.to_array());
        }

        for (d, s) in dst_tail.iter_mut().zip(src_tail) {
            *d = super::normalize(*s);
        }
    }

    #[inline]
    pub fn shift_in_place(buf: &mut [u32]) {
        let simd_end = buf.len() / 4 * 4;
        let (simd_part, tail) = buf.split_at_mut(simd_end);

        for chunk in simd_part.chunks_exact_mut(4) {
            let v = u32x4::new([chunk[0], chunk[1], chunk[2], chunk[3]]) >> SHIFT;
            chunk.copy_from_slice(&v.to_array());
        }

        for px in tail {
            *px = super::normalize(*px);
        }
    }
}

/// Copy one row of native pixels into display pixels.
///
/// `dst` and `src` must have the same length.
#[inline]
pub fn copy_row_normalized(dst: &mut [u32], src: &[u32]) {
    debug_assert_eq!(dst.len(), src.len(), "row length mismatch");
    simd_shift::copy_shifted(dst, src);
}

/// Copy a `width`-wide block of rows, converting every pixel.
///
/// Rows are read from `src` with stride `width` and written to `dst` with
/// stride `dst_stride`, starting at `dst_offset`.
pub fn copy_rect_normalized(
    dst: &mut [u32],
    dst_offset: usize,
    dst_stride: usize,
    src: &[u32],
    width: usize,
    rows: usize,
) {
    if width == 0 {
        return;
    }
    for (row, src_row) in src.chunks_exact(width).take(rows).enumerate() {
        let start = dst_offset + row * dst_stride;
        copy_row_normalized(&mut dst[start..start + width], src_row);
    }
}

/// Convert a whole buffer in place, used once per full-page render
pub fn normalize_in_place(pixels: &mut [u32]) {
    simd_shift::shift_in_place(pixels);
}
